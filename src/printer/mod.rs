//! Status line printing and markdown rendering (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

pub fn step(msg: &str) {
    println!("{} {}", "[•]".cyan(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "[✓]".green(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "[!]".yellow(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "[X]".red(), msg);
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
        println!();
    }
}
