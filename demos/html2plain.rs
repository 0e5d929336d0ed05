extern crate argparse;
extern crate html2plain;
use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};
use html2plain::config;
use std::io;
use std::io::Write;

fn translate<R>(input: R, conf: config::Config) -> html2plain::Result<String>
where
    R: io::Read,
{
    conf.string_from_read(input)
}

fn main() {
    env_logger::init();

    let mut infile: Option<String> = None;
    let mut outfile: Option<String> = None;
    let mut width: usize = html2plain::DEFAULT_WIDTH;
    let mut pretty_tables = false;
    let mut omit_links = false;
    let mut text_only = false;

    {
        let mut ap = ArgumentParser::new();
        ap.refer(&mut infile).add_argument(
            "infile",
            StoreOption,
            "Input HTML file (default is standard input)",
        );
        ap.refer(&mut width).add_option(
            &["-w", "--width"],
            Store,
            "Column width to wrap text at (default is 78)",
        );
        ap.refer(&mut outfile).add_option(
            &["-o", "--output"],
            StoreOption,
            "Output file (default is standard output)",
        );
        ap.refer(&mut pretty_tables).add_option(
            &["-t", "--pretty-tables"],
            StoreTrue,
            "Draw tables as ASCII boxes",
        );
        ap.refer(&mut omit_links).add_option(
            &["--omit-links"],
            StoreTrue,
            "Leave out link targets (with --text-only)",
        );
        ap.refer(&mut text_only).add_option(
            &["-L", "--text-only"],
            StoreTrue,
            "Output only text (no decorations)",
        );
        ap.parse_args_or_exit();
    }

    let mut conf = config::plain().wrap_width(width);
    if pretty_tables {
        conf = conf.pretty_tables();
    }
    if omit_links {
        conf = conf.omit_links();
    }
    if text_only {
        conf = conf.text_only();
    }

    let data = match infile {
        None => {
            let stdin = io::stdin();
            translate(&mut stdin.lock(), conf)
        }
        Some(name) => {
            let mut file = std::fs::File::open(name).expect("Tried to open file");
            translate(&mut file, conf)
        }
    }
    .expect("Failed to convert HTML");

    match outfile {
        None => {
            println!("{}", data);
        }
        Some(name) => {
            let mut file = std::fs::File::create(name).expect("Tried to create file");
            writeln!(file, "{}", data).unwrap();
        }
    };
}
