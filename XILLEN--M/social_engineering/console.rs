/// Line-oriented sink for the progress/report stream.
///
/// Every line is recorded; a stdout console also echoes each line as it is
/// written. Console output cannot fail.
#[derive(Debug, Clone)]
pub struct Console {
    echo: bool,
    lines: Vec<String>,
}

impl Console {
    /// Console echoing to standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            echo: true,
            lines: Vec::new(),
        }
    }

    /// Silent console that only records (tests).
    #[must_use]
    pub const fn captured() -> Self {
        Self {
            echo: false,
            lines: Vec::new(),
        }
    }

    /// Writes one line.
    pub fn line(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.echo {
            println!("{text}");
        }
        self.lines.push(text);
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.line(String::new());
    }

    /// Everything written so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines containing `needle`.
    #[must_use]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines.iter().filter(|line| line.contains(needle)).count()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_console_records_lines() {
        let mut console = Console::captured();
        console.line("[+] Generating target profiles...");
        console.blank();
        console.line(format!("    [+] Analyzed {} techniques", 8));
        assert_eq!(console.lines().len(), 3);
        assert_eq!(console.lines()[1], "");
        assert_eq!(console.count_containing("[+]"), 2);
    }
}
