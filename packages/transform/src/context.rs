/// Indentation-aware output buffer used while generating intermediate code
#[derive(Debug, Default)]
pub struct CodeWriter {
    buffer: String,
    indent_level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn add_line(&mut self, text: &str) {
        if !text.is_empty() {
            self.buffer.push_str(&"  ".repeat(self.indent_level));
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    /// Add every line of `block`, re-indented at the current level
    pub fn add_block(&mut self, block: &str) {
        let lines: Vec<&str> = block.lines().collect();
        let margin = lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start().len())
            .min()
            .unwrap_or(0);

        for line in lines {
            if line.trim().is_empty() {
                self.add_line("");
            } else {
                self.add_line(line.get(margin..).unwrap_or(line.trim_start()).trim_end());
            }
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    pub fn into_output(self) -> String {
        self.buffer
    }
}
