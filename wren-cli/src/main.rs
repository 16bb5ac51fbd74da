//! Wren CLI
//!
//! Headless renderer for testing and debugging: renders an HTML document
//! (local file or URL) to a PNG, or dumps the generated paint command list
//! as JSON.

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use std::env;
use std::path::PathBuf;
use wren_browser::html::parse_html;
use wren_browser::{RenderSession, load_document};

struct Options {
    input: String,
    output: PathBuf,
    dump_commands: bool,
    width: u32,
    height: u32,
}

fn usage() -> ! {
    eprintln!("Usage: wren-cli <file.html|url> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o <path>         output PNG path (default: out.png)");
    eprintln!("  --size <WxH>      viewport size (default: 800x600)");
    eprintln!("  --dump-commands   print the paint command list as JSON and exit");
    std::process::exit(1);
}

fn parse_args() -> Result<Options> {
    let mut args = env::args().skip(1);
    let mut input = None;
    let mut output = PathBuf::from("out.png");
    let mut dump_commands = false;
    let mut width = 800;
    let mut height = 600;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => {
                let Some(path) = args.next() else { usage() };
                output = PathBuf::from(path);
            }
            "--size" => {
                let Some(size) = args.next() else { usage() };
                let Some((w, h)) = size.split_once('x') else {
                    bail!("--size expects WxH, got '{size}'");
                };
                width = w.parse().with_context(|| format!("bad width '{w}'"))?;
                height = h.parse().with_context(|| format!("bad height '{h}'"))?;
            }
            "--dump-commands" => dump_commands = true,
            "-h" | "--help" => usage(),
            _ if input.is_none() => input = Some(arg),
            _ => usage(),
        }
    }

    let Some(input) = input else { usage() };
    Ok(Options {
        input,
        output,
        dump_commands,
        width,
        height,
    })
}

fn main() -> Result<()> {
    let options = parse_args()?;

    let html = load_document(&options.input)
        .with_context(|| format!("loading '{}'", options.input))?;
    let dom = parse_html(&html);

    let session = RenderSession::new(options.width, options.height);

    if options.dump_commands {
        let commands = session.paint(&dom)?;
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(());
    }

    let image = session.render(&dom)?;
    image
        .save(&options.output)
        .with_context(|| format!("saving '{}'", options.output.display()))?;

    println!(
        "{} {} ({}x{}) -> {}",
        "Rendered".green().bold(),
        options.input,
        options.width,
        options.height,
        options.output.display()
    );
    Ok(())
}
