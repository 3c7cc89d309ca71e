//! Syntactic declaration emission
//!
//! Each top-level statement is reduced to its declaration form: bodies and
//! initializers are dropped, types come from annotations or, failing that,
//! from literal initializers. Statements with no declaration surface are
//! omitted.

use crate::lexer::{Tok, Token};
use crate::scanner::{scan, split_statements, Statement};
use sveltedts_common::CompilerOptions;

const MEMBER_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "abstract",
    "declare",
    "override",
    "async",
    "accessor",
    "get",
    "set",
];

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

const MEMBER_INDENT: &str = "    ";

struct DeclContext {
    strict: bool,
    remove_comments: bool,
}

impl DeclContext {
    /// Type used when nothing better can be derived
    fn fallback(&self) -> &'static str {
        if self.strict {
            "unknown"
        } else {
            "any"
        }
    }
}

/// Reduce one TypeScript module to its `.d.ts` text
pub fn emit_declarations(source: &str, options: &CompilerOptions) -> String {
    let ctx = DeclContext {
        strict: options.is_strict(),
        remove_comments: options.removes_comments(),
    };

    let mut declarations: Vec<String> = scan(source)
        .iter()
        .filter_map(|stmt| {
            declare_statement(stmt, &ctx).map(|decl| with_doc(stmt, decl, "", &ctx))
        })
        .collect();
    if declarations.is_empty() {
        declarations.push("export {};".to_string());
    }

    let mut lines: Vec<String> = reference_directives(source).map(str::to_string).collect();
    lines.append(&mut declarations);
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// `/// <reference ... />` lines heading the file
fn reference_directives(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .map(str::trim)
        .take_while(|line| line.is_empty() || line.starts_with("//"))
        .filter(|line| line.starts_with("/// <reference"))
}

fn with_doc(stmt: &Statement<'_>, decl: String, indent: &str, ctx: &DeclContext) -> String {
    match stmt.doc {
        Some(doc) if !ctx.remove_comments => format!("{}\n{}", reindent_doc(doc, indent), decl),
        _ => decl,
    }
}

fn reindent_doc(doc: &str, indent: &str) -> String {
    doc.lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with('*') {
                format!("{} {}", indent, trimmed)
            } else {
                format!("{}{}", indent, trimmed)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn declare_statement(stmt: &Statement<'_>, ctx: &DeclContext) -> Option<String> {
    let sig = stmt.significant();
    let first = *sig.first()?;

    if first.is_word("import") {
        return match sig.get(1).map(|t| t.kind) {
            // `import("x")` and `import.meta` are expressions
            Some(Token::LParen) | Some(Token::Dot) => None,
            _ => Some(terminate(stmt.text())),
        };
    }
    if first.is_word("export") {
        return declare_export(stmt, &sig, ctx);
    }
    let is_type_alias =
        first.is_word("type") && sig.get(1).map(|t| t.kind == Token::Ident).unwrap_or(false);
    if first.is_word("interface") || first.is_word("declare") || is_type_alias {
        return Some(terminate(stmt.text()));
    }

    None
}

fn declare_export(stmt: &Statement<'_>, sig: &[&Tok<'_>], ctx: &DeclContext) -> Option<String> {
    let second = *sig.get(1)?;

    // `export { a }`, `export * from`, `export = x`
    if second.kind == Token::LBrace
        || second.kind == Token::Eq
        || (second.kind == Token::Operator && second.text == "*")
    {
        return Some(terminate(stmt.text()));
    }

    match second.text {
        "default" => declare_default(stmt, sig, ctx),
        "type" | "interface" | "declare" | "import" => Some(terminate(stmt.text())),
        "enum" | "namespace" | "module" => {
            Some(format!("export declare {}", stmt.text_from(second)))
        }
        "const" if sig.get(2).map(|t| t.is_word("enum")).unwrap_or(false) => {
            Some(format!("export declare {}", stmt.text_from(second)))
        }
        "const" | "let" | "var" => declare_variables(stmt, &sig[2..], second.text, ctx),
        "function" | "async" => declare_function(stmt, &sig[1..], "export declare ", ctx),
        "class" | "abstract" => declare_class(stmt, &sig[1..], "export declare ", ctx),
        _ => None,
    }
}

fn declare_default(stmt: &Statement<'_>, sig: &[&Tok<'_>], ctx: &DeclContext) -> Option<String> {
    let rest = strip_semicolon(&sig[2..]);
    let first = *rest.first()?;

    match first.text {
        "class" | "abstract" => declare_class(stmt, rest, "export default ", ctx),
        "function" | "async" => declare_function(stmt, rest, "export default ", ctx),
        "interface" => Some(terminate(stmt.text())),
        _ if rest.len() == 1 && first.kind == Token::Ident => Some(terminate(stmt.text())),
        _ => Some(format!(
            "declare const _default: {};\nexport default _default;",
            ctx.fallback()
        )),
    }
}

fn declare_variables(
    stmt: &Statement<'_>,
    toks: &[&Tok<'_>],
    keyword: &str,
    ctx: &DeclContext,
) -> Option<String> {
    let mut lines = Vec::new();

    for declarator in split_top_level(strip_semicolon(toks), Token::Comma) {
        let Some(name) = declarator.first() else { continue };
        // Destructuring patterns have no single name to declare
        if name.kind != Token::Ident {
            continue;
        }

        let mut i = 1;
        if declarator.get(i).map(|t| t.kind == Token::Operator && t.text == "!").unwrap_or(false) {
            i += 1;
        }
        let eq = find_top_level(&declarator[i..], Token::Eq).map(|offset| offset + i);

        let annotation = if declarator.get(i).map(|t| t.kind == Token::Colon).unwrap_or(false) {
            let end = eq.unwrap_or(declarator.len());
            span_text(stmt, &declarator[i + 1..end]).map(|ty| format!(": {}", ty))
        } else {
            None
        };

        let suffix = match (annotation, eq) {
            (Some(annotation), _) => annotation,
            (None, Some(eq)) => match infer(stmt, &declarator[eq + 1..], keyword == "const", ctx) {
                Inferred::Literal(literal) => format!(" = {}", literal),
                Inferred::Type(ty) => format!(": {}", ty),
            },
            (None, None) => format!(": {}", ctx.fallback()),
        };

        lines.push(format!("export declare {} {}{};", keyword, name.text, suffix));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

enum Inferred {
    Literal(String),
    Type(String),
}

/// Derive a declaration type from an initializer
fn infer(stmt: &Statement<'_>, init: &[&Tok<'_>], is_const: bool, ctx: &DeclContext) -> Inferred {
    let init = strip_semicolon(init);
    let literal = |text: String, widened: &str| {
        if is_const {
            Inferred::Literal(text)
        } else {
            Inferred::Type(widened.to_string())
        }
    };

    match init {
        [single] => match single.kind {
            Token::Str => return literal(single.text.to_string(), "string"),
            Token::Template => return Inferred::Type("string".to_string()),
            Token::Number => return literal(single.text.to_string(), "number"),
            Token::Ident if single.text == "true" || single.text == "false" => {
                return literal(single.text.to_string(), "boolean")
            }
            _ => {}
        },
        [minus, number] if minus.text == "-" && number.kind == Token::Number => {
            return literal(format!("-{}", number.text), "number");
        }
        _ => {}
    }

    // `value as Type`
    if let Some(as_index) = init.iter().rposition(|t| t.is_word("as")) {
        let target = &init[as_index + 1..];
        let is_const_assertion = target.len() == 1 && target[0].is_word("const");
        if !is_const_assertion {
            if let Some(ty) = span_text(stmt, target) {
                return Inferred::Type(ty.to_string());
            }
        }
    }

    // `new Thing(...)`
    if let [new, class, ..] = init {
        if new.is_word("new") && class.kind == Token::Ident {
            return Inferred::Type(class.text.to_string());
        }
    }

    if let Some(signature) = arrow_signature(stmt, init, ctx) {
        return Inferred::Type(signature);
    }

    Inferred::Type(ctx.fallback().to_string())
}

/// `(a: A) => ...` / `async (a: A): R => ...` as a function type
fn arrow_signature(stmt: &Statement<'_>, init: &[&Tok<'_>], ctx: &DeclContext) -> Option<String> {
    let mut i = 0;
    let is_async = init.first()?.is_word("async");
    if is_async {
        i += 1;
    }
    let generics = if init.get(i)?.kind == Token::Lt {
        let close = match_angle(init, i)?;
        let text = span_text(stmt, &init[i..=close])?.to_string();
        i = close + 1;
        text
    } else {
        String::new()
    };
    if init.get(i)?.kind != Token::LParen {
        return None;
    }
    let close = match_bracket(init, i)?;
    let params = rewrite_params(stmt, &init[i + 1..close], ctx);
    let after = &init[close + 1..];
    let arrow = after.iter().position(|t| t.kind == Token::Arrow)?;

    let ret = if after.first().map(|t| t.kind == Token::Colon).unwrap_or(false) {
        span_text(stmt, &after[1..arrow])?.to_string()
    } else {
        let body = &after[arrow + 1..];
        let base = if body.first().map(|t| t.kind == Token::LBrace).unwrap_or(false)
            && !returns_value(body)
        {
            "void"
        } else {
            ctx.fallback()
        };
        if is_async {
            format!("Promise<{}>", base)
        } else {
            base.to_string()
        }
    };

    Some(format!("{}({}) => {}", generics, params, ret))
}

fn declare_function(
    stmt: &Statement<'_>,
    toks: &[&Tok<'_>],
    prefix: &str,
    ctx: &DeclContext,
) -> Option<String> {
    let mut i = 0;
    let is_async = toks.get(i)?.is_word("async");
    if is_async {
        i += 1;
    }
    if !toks.get(i)?.is_word("function") {
        return None;
    }
    i += 1;
    let is_generator = toks
        .get(i)
        .map(|t| t.kind == Token::Operator && t.text == "*")
        .unwrap_or(false);
    if is_generator {
        i += 1;
    }

    let name = if toks.get(i)?.kind == Token::Ident {
        i += 1;
        format!(" {}", toks[i - 1].text)
    } else {
        String::new()
    };

    let signature = callable_signature(stmt, &toks[i..], is_async, is_generator, ctx)?;
    Some(format!("{}function{}{};", prefix, name, signature))
}

/// `<T>(params): Ret` for a function or method starting at its generics or `(`
fn callable_signature(
    stmt: &Statement<'_>,
    toks: &[&Tok<'_>],
    is_async: bool,
    is_generator: bool,
    ctx: &DeclContext,
) -> Option<String> {
    let mut i = 0;
    let generics = if toks.get(i)?.kind == Token::Lt {
        let close = match_angle(toks, i)?;
        let text = span_text(stmt, &toks[i..=close])?.to_string();
        i = close + 1;
        text
    } else {
        String::new()
    };

    if toks.get(i)?.kind != Token::LParen {
        return None;
    }
    let close = match_bracket(toks, i)?;
    let params = rewrite_params(stmt, &toks[i + 1..close], ctx);
    let after = strip_semicolon(&toks[close + 1..]);
    let body_start = body_start(after);

    let ret = if after.first().map(|t| t.kind == Token::Colon).unwrap_or(false) {
        let end = body_start.unwrap_or(after.len());
        span_text(stmt, &after[1..end])?.to_string()
    } else if is_generator {
        ctx.fallback().to_string()
    } else {
        let body = body_start.map(|start| &after[start..]).unwrap_or(&[]);
        let base = if returns_value(body) { ctx.fallback() } else { "void" };
        if is_async {
            format!("Promise<{}>", base)
        } else {
            base.to_string()
        }
    };

    Some(format!("{}({}): {}", generics, params, ret))
}

/// Parameters with initializers become optional, accessibility modifiers are dropped
fn rewrite_params(stmt: &Statement<'_>, toks: &[&Tok<'_>], ctx: &DeclContext) -> String {
    split_top_level(toks, Token::Comma)
        .into_iter()
        .filter_map(|param| {
            let mut param = param;
            while param.len() > 1
                && param[0].kind == Token::Ident
                && PARAM_MODIFIERS.contains(&param[0].text)
                && matches!(
                    param[1].kind,
                    Token::Ident | Token::LBrace | Token::LBracket | Token::Spread
                )
            {
                param = &param[1..];
            }

            let Some(eq) = find_top_level(param, Token::Eq) else {
                return span_text(stmt, param).map(str::to_string);
            };
            let head = &param[..eq];
            match find_top_level(head, Token::Colon) {
                Some(colon) => {
                    let name = span_text(stmt, &head[..colon])?.trim_end_matches('?');
                    let ty = span_text(stmt, &head[colon + 1..])?;
                    Some(format!("{}?: {}", name, ty))
                }
                None => {
                    let name = span_text(stmt, head)?;
                    let ty = match infer(stmt, &param[eq + 1..], false, ctx) {
                        Inferred::Literal(literal) => literal,
                        Inferred::Type(ty) => ty,
                    };
                    Some(format!("{}?: {}", name, ty))
                }
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn declare_class(
    stmt: &Statement<'_>,
    toks: &[&Tok<'_>],
    prefix: &str,
    ctx: &DeclContext,
) -> Option<String> {
    let class_index = toks.iter().position(|t| t.is_word("class"))?;
    let open = find_body_open(toks, class_index + 1)?;
    let close = match_bracket(toks, open)?;
    let header = span_text(stmt, &toks[..open])?.trim();

    let (body_open, body_close) = (toks[open].span.end, toks[close].span.start);
    let inner: Vec<Tok<'_>> = stmt
        .tokens
        .iter()
        .filter(|t| t.span.start >= body_open && t.span.end <= body_close)
        .cloned()
        .collect();

    let members: Vec<String> = split_statements(stmt.source(), &inner)
        .iter()
        .filter_map(|member| {
            declare_member(member, ctx)
                .map(|decl| with_doc(member, format!("{}{}", MEMBER_INDENT, decl), MEMBER_INDENT, ctx))
        })
        .collect();

    let mut output = format!("{}{} {{\n", prefix, header);
    for member in members {
        output.push_str(&member);
        output.push('\n');
    }
    output.push('}');
    Some(output)
}

fn declare_member(member: &Statement<'_>, ctx: &DeclContext) -> Option<String> {
    let sig = member.significant();
    let sig = strip_semicolon(&sig);

    let mut i = 0;
    let mut modifiers: Vec<&str> = Vec::new();
    while let Some(tok) = sig.get(i) {
        let followed_by_name = sig.get(i + 1).map(|next| starts_member_name(next)).unwrap_or(false);
        if tok.kind == Token::Ident && MEMBER_MODIFIERS.contains(&tok.text) && followed_by_name {
            modifiers.push(tok.text);
            i += 1;
        } else {
            break;
        }
    }

    let name_tok = *sig.get(i)?;
    // ES private names and static blocks never surface in declarations
    if (name_tok.kind == Token::Operator && name_tok.text.starts_with('#'))
        || name_tok.kind == Token::LBrace
    {
        return None;
    }
    if name_tok.kind == Token::LBracket {
        if sig.last().map(|t| t.kind == Token::RBrace).unwrap_or(false) {
            return None;
        }
        return Some(terminate(member.text()));
    }
    if modifiers.contains(&"abstract") {
        return Some(terminate(member.text()));
    }

    let name = name_tok.text;
    i += 1;
    let mut optional = "";
    match sig.get(i) {
        Some(t) if t.kind == Token::Question => {
            optional = "?";
            i += 1;
        }
        Some(t) if t.kind == Token::Operator && t.text == "!" => i += 1,
        _ => {}
    }

    let is_async = modifiers.contains(&"async");
    let kept: Vec<&str> = modifiers
        .iter()
        .copied()
        .filter(|m| !matches!(*m, "async" | "public" | "override" | "declare" | "accessor"))
        .collect();
    let prefix = if kept.is_empty() {
        String::new()
    } else {
        format!("{} ", kept.join(" "))
    };

    if kept.contains(&"private") {
        let visible: Vec<&str> = kept
            .iter()
            .copied()
            .filter(|m| matches!(*m, "private" | "static" | "readonly"))
            .collect();
        return Some(format!("{} {}{};", visible.join(" "), name, optional));
    }

    let rest = &sig[i..];
    match rest.first().map(|t| t.kind) {
        Some(Token::LParen) | Some(Token::Lt) => {
            if name == "constructor" {
                let close = match_bracket(rest, 0)?;
                let params = rewrite_params(member, &rest[1..close], ctx);
                return Some(format!("constructor({});", params));
            }
            let signature = callable_signature(member, rest, is_async, false, ctx)?;
            if kept.contains(&"set") {
                // Setters carry no return type
                let without_ret = signature.rsplit_once("): ").map(|(head, _)| head).unwrap_or(&signature);
                return Some(format!("{}{}{});", prefix, name, without_ret));
            }
            Some(format!("{}{}{}{};", prefix, name, optional, signature))
        }
        Some(Token::Colon) => {
            let end = find_top_level(rest, Token::Eq).unwrap_or(rest.len());
            let ty = span_text(member, &rest[1..end])?;
            Some(format!("{}{}{}: {};", prefix, name, optional, ty))
        }
        Some(Token::Eq) => {
            let is_readonly = kept.contains(&"readonly");
            match infer(member, &rest[1..], is_readonly, ctx) {
                Inferred::Literal(literal) => Some(format!("{}{}{} = {};", prefix, name, optional, literal)),
                Inferred::Type(ty) => Some(format!("{}{}{}: {};", prefix, name, optional, ty)),
            }
        }
        None => Some(format!("{}{}{}: {};", prefix, name, optional, ctx.fallback())),
        _ => None,
    }
}

fn starts_member_name(tok: &Tok<'_>) -> bool {
    match tok.kind {
        Token::Ident | Token::Str | Token::Number | Token::LBracket => true,
        Token::Operator => tok.text.starts_with('#') || tok.text == "*",
        _ => false,
    }
}

fn returns_value(body: &[&Tok<'_>]) -> bool {
    body.windows(2).any(|pair| {
        pair[0].is_word("return") && !matches!(pair[1].kind, Token::Semicolon | Token::RBrace)
    })
}

/// Append `;` unless the text already ends a declaration
fn terminate(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(';') || trimmed.ends_with('}') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}

fn strip_semicolon<'a, 'src>(toks: &'a [&'a Tok<'src>]) -> &'a [&'a Tok<'src>] {
    match toks.split_last() {
        Some((last, rest)) if last.kind == Token::Semicolon => rest,
        _ => toks,
    }
}

fn span_text<'src>(stmt: &Statement<'src>, toks: &[&Tok<'src>]) -> Option<&'src str> {
    let (first, last) = (toks.first()?, toks.last()?);
    let text = stmt.slice(first, last).trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Index of the closing bracket matching the opener at `open`
fn match_bracket(toks: &[&Tok<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, tok) in toks.iter().enumerate().skip(open) {
        if tok.kind.opens() {
            depth += 1;
        } else if tok.kind.closes() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Index of the `>` matching the `<` at `open`, ignoring bracketed content
fn match_angle(toks: &[&Tok<'_>], open: usize) -> Option<usize> {
    let mut angle = 0usize;
    let mut brackets = 0usize;
    for (index, tok) in toks.iter().enumerate().skip(open) {
        match tok.kind {
            k if k.opens() => brackets += 1,
            k if k.closes() => brackets = brackets.saturating_sub(1),
            Token::Lt if brackets == 0 => angle += 1,
            Token::Gt if brackets == 0 => {
                angle = angle.checked_sub(1)?;
                if angle == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Start of a trailing `{ ... }` body, found by walking back from its `}`
fn body_start(toks: &[&Tok<'_>]) -> Option<usize> {
    if toks.last()?.kind != Token::RBrace {
        return None;
    }
    let mut depth = 0usize;
    for (index, tok) in toks.iter().enumerate().rev() {
        if tok.kind.closes() {
            depth += 1;
        } else if tok.kind.opens() {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// First `{` outside parentheses and type arguments, starting at `from`
fn find_body_open(toks: &[&Tok<'_>], from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, tok) in toks.iter().enumerate().skip(from) {
        match tok.kind {
            Token::LBrace if depth == 0 => return Some(index),
            Token::LParen | Token::LBracket | Token::LBrace | Token::Lt => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace | Token::Gt => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
    }
    None
}

fn find_top_level(toks: &[&Tok<'_>], kind: Token) -> Option<usize> {
    let mut depth = 0usize;
    for (index, tok) in toks.iter().enumerate() {
        match tok.kind {
            k if k == kind && depth == 0 => return Some(index),
            Token::LParen | Token::LBracket | Token::LBrace | Token::Lt => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace | Token::Gt => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
    }
    None
}

fn split_top_level<'a, 'src>(toks: &'a [&'a Tok<'src>], separator: Token) -> Vec<&'a [&'a Tok<'src>]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, tok) in toks.iter().enumerate() {
        match tok.kind {
            k if k == separator && depth == 0 => {
                parts.push(&toks[start..index]);
                start = index + 1;
            }
            Token::LParen | Token::LBracket | Token::LBrace | Token::Lt => depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace | Token::Gt => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
    }
    parts.push(&toks[start..]);
    parts.into_iter().filter(|part| !part.is_empty()).collect()
}
