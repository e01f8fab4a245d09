use tokmatch::{Doc, Match, Matcher, PhraseMatcher, RunMetrics};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Everything one CLI run produced.
pub struct Report<'a> {
    pub doc: &'a Doc,
    pub matcher: &'a Matcher,
    pub phrases: &'a PhraseMatcher,
    pub matches: &'a [Match],
    pub phrase_matches: &'a [Match],
    pub metrics: &'a RunMetrics,
}

pub fn print_run(report: &Report<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    let title = format!("⚙  Matching: \"{}\" ({} tokens)", report.doc.text(), report.doc.len());
    println!("\n{}", palette.bold(palette.paint(title, ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Pattern matches ━━━", ansi::GRAY));
    if report.matcher.is_empty() {
        println!("{}", palette.dim("  No pattern rules loaded"));
    } else if report.matches.is_empty() {
        println!("{}", palette.dim("  No matches"));
    } else {
        print_matches(report.doc, report.matches, |m| report.matcher.key_name(m.key), &palette);
    }

    if !report.phrases.is_empty() {
        println!("\n{}", palette.paint(format!("━━━ Phrase matches ({}) ━━━", report.phrases.attr()), ansi::GRAY));
        if report.phrase_matches.is_empty() {
            println!("{}", palette.dim("  No matches"));
        } else {
            print_matches(report.doc, report.phrase_matches, |m| report.phrases.key_name(m.key), &palette);
        }
    }

    println!("\n{}", palette.paint("━━━ Engine ━━━", ansi::GRAY));
    print_engine(report.metrics, &palette);

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Simulation: {}  │  Callbacks: {}",
        palette.paint(format!("{:?}", report.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", report.metrics.simulation.duration), ansi::CYAN),
        palette.dim(format!("{:?}", report.metrics.callbacks)),
    );
    println!();
}

fn print_matches<'k>(doc: &Doc, matches: &[Match], key_name: impl Fn(&Match) -> Option<&'k str>, palette: &ansi::Palette) {
    for (idx, m) in matches.iter().enumerate() {
        println!(
            "  {} {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(palette.paint(key_name(m).unwrap_or("?"), ansi::BLUE)),
            palette.dim("│"),
            palette.paint(format!("span {}..{}", m.start, m.end), ansi::YELLOW),
            palette.paint(format!("\"{}\"", doc.span_text(m.start, m.end)), ansi::GREEN),
        );
    }
}

fn print_engine(metrics: &RunMetrics, palette: &ansi::Palette) {
    let sim = &metrics.simulation;
    let skipped = sim.total_fragments.saturating_sub(sim.active_fragments);
    println!(
        "  {} {}/{}  {}",
        palette.paint("Patterns active:", ansi::BLUE),
        palette.paint(sim.active_fragments.to_string(), ansi::GREEN),
        sim.total_fragments,
        if skipped > 0 { palette.dim(format!("({} skipped by trigger scan)", skipped)) } else { String::new() }
    );
    println!(
        "  {} {}  {} {}  {} {}  {} {}",
        palette.dim("starts:"),
        palette.paint(sim.starts.to_string(), ansi::YELLOW),
        palette.dim("steps:"),
        palette.paint(sim.steps.to_string(), ansi::YELLOW),
        palette.dim("states:"),
        palette.paint(sim.states_visited.to_string(), ansi::YELLOW),
        palette.dim("accepts:"),
        palette.paint(sim.accepts.to_string(), ansi::YELLOW)
    );
}
