use console::style;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    /// One ranked file: importance bar, percent, role, path and reason
    pub fn ranked_line(&self, pct: u32, role: &str, path: &str, reason: Option<&str>) {
        let filled = (pct as usize).div_ceil(10).min(10);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
        let pct_text = format!("{:>3}%", pct);
        let pct_styled = match pct {
            80.. => style(pct_text).green(),
            50..=79 => style(pct_text).yellow(),
            _ => style(pct_text).dim(),
        };
        match reason {
            Some(reason) => println!(
                "{} {} {:<6} {}  {}",
                bar,
                pct_styled,
                role,
                path,
                style(format!("({})", reason)).dim()
            ),
            None => println!("{} {} {:<6} {}", bar, pct_styled, role, path),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
