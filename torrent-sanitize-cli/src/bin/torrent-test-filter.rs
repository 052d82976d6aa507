use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use torrent_sanitize::sanitize::UrlFilter;
use torrent_sanitize_cli::{load_url_filter, setup_logging};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "torrent-test-filter\n\n\
    Runs every line of URLS through the url filter in FILTER and reports\n\
    whether it was removed, passed or replaced.")]
struct Args {
    /// Print the results as an html table
    #[arg(long)]
    html: bool,

    /// Log debug messages
    #[arg(short, long)]
    debug: bool,

    filter: PathBuf,

    urls: PathBuf,
}

/// What the filter made of a URL.
enum Outcome {
    Removed,
    Passed,
    Replaced(Vec<String>),
}

fn test_url(filter: &UrlFilter, url: &str) -> Outcome {
    let results = filter.filter(url);
    if results.is_empty() {
        Outcome::Removed
    } else if results.len() == 1 && results[0].url == url {
        Outcome::Passed
    } else {
        Outcome::Replaced(results.into_iter().map(|result| result.url).collect())
    }
}

const HTML_HEADER: &str = "<html><head><title>Filter results</title>\
    <style type=\"text/css\" media=\"all\">* {font-family: verdana, arial, helvetica, sans-serif;font-size: 10px;} \
    .red{color:red}.green{color:green}.blue{color:blue}</style></head>\
    <body><table><tr><th>Status</th><th>Original</th><th>Result</th></tr>";

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug)?;

    let filter = load_url_filter(&args.filter)?;
    let urls = fs::read_to_string(&args.urls)
        .with_context(|| format!("{}: couldn't read file", args.urls.display()))?;

    if args.html {
        println!("{}", HTML_HEADER);
    }

    for url in urls.lines().filter(|line| !line.is_empty()) {
        match (test_url(&filter, url), args.html) {
            (Outcome::Removed, false) => println!("REMOVED   {}", url),
            (Outcome::Removed, true) => println!("<tr><td class=\"red\">REMOVED</td><td>{}</td></tr>", url),
            (Outcome::Passed, false) => println!("PASSED    {}", url),
            (Outcome::Passed, true) => {
                println!("<tr><td class=\"green\">PASSED</td><td>{0}</td><td>{0}</td></tr>", url)
            },
            (Outcome::Replaced(results), false) => println!("REPLACED  {}    {}", url, results.join(" ")),
            (Outcome::Replaced(results), true) => println!(
                "<tr><td class=\"blue\">REPLACED</td><td>{}</td><td class=\"blue\"> {}</td></tr>",
                url,
                results.join(" ")
            ),
        }
    }

    if args.html {
        println!("</table></body></html>");
    }
    Ok(())
}
