//! Flag catalogue listing: `yt2ultrastar flags`.

use console::style;

pub fn cmd_flags() {
    use yt2ultrastar::options::{FLAGS, FlagKind};

    println!();
    println!("UltraSinger Flags");
    println!("=================");
    println!();
    println!("Pass with -f NAME or -f NAME=VALUE. Choice flags default to their first value.");
    println!();

    for spec in FLAGS {
        let usage = match spec.kind {
            FlagKind::Switch => spec.name.to_string(),
            FlagKind::Choice => format!("{}=<choice>", spec.name),
            FlagKind::Value => format!("{}[=<value>]", spec.name),
        };
        println!("  {:<28} {}", style(usage).cyan(), spec.help);
        if spec.kind == FlagKind::Choice {
            println!("  {:<28} {}", "", style(spec.choices.join(", ")).dim());
        }
    }
    println!();
}
