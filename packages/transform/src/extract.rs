//! Pulls the pieces needed for typing out of a `.svelte` file: script blocks,
//! `export let` props, dispatcher events and slots.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static SCRIPT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<script(\s[^>]*)?>").expect("valid script regex"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<style(\s[^>]*)?>.*?</style>").expect("valid style regex"));

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static EXPORT_LET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*export[ \t]+let[ \t]+([A-Za-z_$][\w$]*)").expect("valid prop regex")
});

static EXPORT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)export[ \t]+(let|const|var|function|class|async)\b")
        .expect("valid export regex")
});

static SLOT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<slot\b([^>]*?)/?>").expect("valid slot regex"));

static SLOT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{([A-Za-z_$][\w$]*)\}|([A-Za-z_$][\w$:-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|\{[^}]*\}))?"#)
        .expect("valid attribute regex")
});

/// Raw script contents of a component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptBlocks {
    /// `<script context="module">`
    pub module: Option<String>,
    /// Instance `<script>`
    pub instance: Option<String>,
    /// Markup with script, style and comment blocks removed
    pub markup: String,
}

/// A single `export let` prop
#[derive(Debug, Clone, PartialEq)]
pub struct PropDecl {
    pub name: String,
    pub type_text: String,
    pub optional: bool,
}

/// Everything the transformer needs from one component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentParts {
    pub module_script: Option<String>,
    pub imports: Vec<String>,
    /// Instance script without imports and with `export` stripped
    pub body: String,
    pub props: Vec<PropDecl>,
    /// Dispatched events and their payload types; `None` when untyped
    pub events: Option<Vec<(String, String)>>,
    /// Slot name -> slot prop names
    pub slots: BTreeMap<String, Vec<String>>,
}

impl ComponentParts {
    pub fn parse(source: &str) -> Result<Self, String> {
        let blocks = ScriptBlocks::extract(source)?;
        let instance = blocks.instance.clone().unwrap_or_default();
        let (imports, rest) = split_imports(&instance);

        Ok(Self {
            module_script: blocks.module.clone(),
            imports,
            body: EXPORT_KEYWORD.replace_all(&rest, "$1$2").into_owned(),
            props: extract_props(&instance),
            events: extract_events(&instance),
            slots: extract_slots(&blocks.markup),
        })
    }
}

impl ScriptBlocks {
    pub fn extract(source: &str) -> Result<Self, String> {
        let mut blocks = ScriptBlocks::default();
        let mut markup = String::new();
        let mut cursor = 0;

        while let Some(open) = SCRIPT_OPEN.captures_at(source, cursor) {
            let tag = open.get(0).map(|m| m.range()).unwrap_or(cursor..cursor);
            let attrs = open.get(1).map(|m| m.as_str()).unwrap_or("");
            let close = source[tag.end..]
                .find("</script>")
                .map(|offset| tag.end + offset)
                .ok_or_else(|| format!("unterminated <script> block at offset {}", tag.start))?;

            markup.push_str(&source[cursor..tag.start]);
            let content = source[tag.end..close].to_string();
            if is_module_script(attrs) {
                blocks.module = Some(content);
            } else {
                blocks.instance = Some(content);
            }
            cursor = close + "</script>".len();
        }
        markup.push_str(&source[cursor..]);

        let markup = STYLE_BLOCK.replace_all(&markup, "");
        blocks.markup = HTML_COMMENT.replace_all(&markup, "").into_owned();
        Ok(blocks)
    }
}

fn is_module_script(attrs: &str) -> bool {
    attrs.contains("context=\"module\"")
        || attrs.contains("context='module'")
        || attrs.split_whitespace().any(|attr| attr == "module")
}

/// Split top-level import statements from the rest of a script
fn split_imports(script: &str) -> (Vec<String>, String) {
    let mut imports = Vec::new();
    let mut rest = String::new();
    let mut pending: Option<String> = None;

    for line in script.lines() {
        if let Some(statement) = pending.as_mut() {
            statement.push('\n');
            statement.push_str(line.trim_end());
            if import_is_complete(statement) {
                imports.extend(pending.take());
            }
            continue;
        }

        let trimmed = line.trim();
        let is_import = trimmed.starts_with("import ")
            || trimmed.starts_with("import{")
            || trimmed.starts_with("import\"")
            || trimmed.starts_with("import'");
        if is_import && !trimmed.starts_with("import(") {
            let statement = trimmed.to_string();
            if import_is_complete(&statement) {
                imports.push(statement);
            } else {
                pending = Some(statement);
            }
        } else {
            rest.push_str(line);
            rest.push('\n');
        }
    }
    imports.extend(pending);

    (imports, rest)
}

fn import_is_complete(statement: &str) -> bool {
    let trimmed = statement.trim_end();
    trimmed.ends_with(';') || trimmed.ends_with('"') || trimmed.ends_with('\'')
}

fn extract_props(script: &str) -> Vec<PropDecl> {
    let mut props = Vec::new();

    for captures in EXPORT_LET.captures_iter(script) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let rest = script[whole.end()..].lines().next().unwrap_or("");
        let (annotation, default) = split_declarator(rest);

        let type_text = annotation
            .clone()
            .or_else(|| default.as_deref().map(infer_literal_type))
            .unwrap_or_else(|| "any".to_string());

        props.push(PropDecl {
            name: name.as_str().to_string(),
            type_text,
            optional: default.is_some(),
        });
    }

    props
}

/// Split `: Type = value;` into its annotation and initializer
fn split_declarator(rest: &str) -> (Option<String>, Option<String>) {
    let rest = rest.trim().trim_end_matches(';').trim_end();
    let mut depth = 0i32;
    let chars: Vec<(usize, char)> = rest.char_indices().collect();
    let mut assign_at = None;

    for (i, &(offset, ch)) in chars.iter().enumerate() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if i > 0 && chars[i - 1].1 != '=' => depth -= 1,
            '=' if depth <= 0 => {
                let next = chars.get(i + 1).map(|&(_, c)| c);
                let prev = if i > 0 { Some(chars[i - 1].1) } else { None };
                if next != Some('>') && next != Some('=') && prev != Some('!') && prev != Some('=') {
                    assign_at = Some(offset);
                    break;
                }
            }
            _ => {}
        }
    }

    let (head, default) = match assign_at {
        Some(offset) => (&rest[..offset], Some(rest[offset + 1..].trim().to_string())),
        None => (rest, None),
    };

    let annotation = head
        .trim()
        .strip_prefix(':')
        .map(|ty| ty.trim().to_string())
        .filter(|ty| !ty.is_empty());

    (annotation, default.filter(|value| !value.is_empty()))
}

/// Widened type of a literal initializer, `any` when it is not a literal
pub fn infer_literal_type(value: &str) -> String {
    let value = value.trim();
    let ty = if value.starts_with('\'') || value.starts_with('"') || value.starts_with('`') {
        "string"
    } else if value == "true" || value == "false" {
        "boolean"
    } else if is_number_literal(value) {
        "number"
    } else {
        "any"
    };
    ty.to_string()
}

fn is_number_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty()
        && digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '_' || c == 'e' || c == 'x')
}

fn extract_events(script: &str) -> Option<Vec<(String, String)>> {
    // The first mention is usually the import, so look for the typed call
    let body = script
        .match_indices("createEventDispatcher")
        .find_map(|(start, name)| {
            let after = script[start + name.len()..].trim_start();
            balanced_braces(after.strip_prefix('<')?.trim_start())
        })?;

    let events = split_top_level(body, &[';', ',', '\n'])
        .into_iter()
        .filter_map(|member| {
            let (key, ty) = member.split_once(':')?;
            let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
            let key = key.trim_end_matches('?');
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), ty.trim().to_string()))
        })
        .collect();

    Some(events)
}

/// Contents between a leading `{` and its matching `}`
fn balanced_braces(text: &str) -> Option<&str> {
    if !text.starts_with('{') {
        return None;
    }
    let mut depth = 0;
    for (offset, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[1..offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = ' ';

    for (offset, ch) in text.char_indices() {
        match ch {
            '{' | '(' | '[' | '<' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            '>' if prev != '=' => depth -= 1,
            c if depth == 0 && separators.contains(&c) => {
                parts.push(&text[start..offset]);
                start = offset + c.len_utf8();
            }
            _ => {}
        }
        prev = ch;
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn extract_slots(markup: &str) -> BTreeMap<String, Vec<String>> {
    let mut slots = BTreeMap::new();

    for captures in SLOT_TAG.captures_iter(markup) {
        let attrs = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let mut name = "default".to_string();
        let mut props = Vec::new();

        for attr in SLOT_ATTR.captures_iter(attrs) {
            if let Some(shorthand) = attr.get(1) {
                props.push(shorthand.as_str().to_string());
                continue;
            }
            let Some(key) = attr.get(2) else { continue };
            if key.as_str() == "name" {
                if let Some(value) = attr.get(3).or_else(|| attr.get(4)) {
                    name = value.as_str().to_string();
                }
            } else {
                props.push(key.as_str().to_string());
            }
        }

        let entry: &mut Vec<String> = slots.entry(name).or_default();
        for prop in props {
            if !entry.contains(&prop) {
                entry.push(prop);
            }
        }
    }

    slots
}
