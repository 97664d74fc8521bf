use inksac::prelude::*;

/// Terminal colours for shell output. Falls back to plain text when the
/// terminal has no colour support.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color_support: ColorSupport,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    /// A palette that never emits escape codes.
    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.color_support, ColorSupport::NoColor)
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.is_plain() {
            return text.to_string();
        }
        text.style(style).to_string()
    }

    pub fn error_tag(&self) -> String {
        let style = Style::builder().foreground(Color::Red).bold().build();
        self.paint("[Error]", style)
    }

    pub fn warning_tag(&self) -> String {
        let style = Style::builder().foreground(Color::Yellow).bold().build();
        self.paint("[Warning]", style)
    }

    /// The `<cwd>> ` prompt.
    pub fn prompt(&self, prompt: &str) -> String {
        let style = Style::builder().foreground(Color::Green).bold().build();
        self.paint(prompt, style)
    }

    pub fn directory(&self, name: &str) -> String {
        let style = Style::builder().foreground(Color::Blue).bold().build();
        self.paint(name, style)
    }

    pub fn command(&self, name: &str) -> String {
        let style = Style::builder().foreground(Color::Cyan).bold().build();
        self.paint(name, style)
    }

    pub fn heading(&self, text: &str) -> String {
        let style = Style::builder().foreground(Color::Magenta).bold().build();
        self.paint(text, style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_palette_emits_no_escapes() {
        let palette = Palette::plain();
        assert_eq!(palette.error_tag(), "[Error]");
        assert_eq!(palette.warning_tag(), "[Warning]");
        assert_eq!(palette.prompt("/tmp> "), "/tmp> ");
        assert_eq!(palette.command("ls"), "ls");
        assert_eq!(palette.directory("src"), "src");
    }
}
