use clap::Parser;
use std::io::Read;

use viml_parser::{compile_to_string, parse, NodeRef, ParseOption};

#[derive(Parser)]
#[command(name = "viml-parser")]
#[command(about = "Parse Vim script and print the canonical form")]
#[command(version)]
struct Cli {
    /// Use the neovim dialect
    #[arg(long = "neovim")]
    neovim: bool,

    /// Print the AST as JSON instead of the canonical form
    #[arg(long = "json")]
    json: bool,

    /// Script files to parse (stdin when omitted)
    #[arg()]
    files: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let opt = ParseOption { neovim: cli.neovim };

    let mut exit_code = 0;

    if cli.files.is_empty() {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: No input. Provide script files or pipe a script via stdin.");
            std::process::exit(1);
        }
        let mut src = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut src) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        if run("", &src, cli.json, &opt).is_err() {
            exit_code = 1;
        }
    } else {
        // one file failing does not block the rest
        for file in &cli.files {
            let src = match std::fs::read_to_string(file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", file, e);
                    exit_code = 1;
                    continue;
                }
            };
            if run(file, &src, cli.json, &opt).is_err() {
                exit_code = 1;
            }
        }
    }

    std::process::exit(exit_code);
}

fn run(name: &str, src: &str, json: bool, opt: &ParseOption) -> Result<(), ()> {
    let file = match parse(src, opt) {
        Ok(file) => file,
        Err(e) => {
            report(name, &e.to_string());
            return Err(());
        }
    };
    let out = if json {
        match serde_json::to_string_pretty(&file) {
            Ok(s) => s,
            Err(e) => {
                report(name, &e.to_string());
                return Err(());
            }
        }
    } else {
        match compile_to_string(NodeRef::File(&file)) {
            Ok(s) => s,
            Err(e) => {
                report(name, &e.to_string());
                return Err(());
            }
        }
    };
    println!("{}", out);
    Ok(())
}

fn report(name: &str, msg: &str) {
    if name.is_empty() {
        eprintln!("{}", msg);
    } else {
        eprintln!("{}: {}", name, msg);
    }
}
