use crate::automation::Region;
use crate::automation::runner::DEFAULT_INTERVAL_MS;
use crate::recognition::config::DEFAULT_THRESHOLD;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Poll the source on an interval
    Watch,
    /// Classify a single capture and exit
    Once,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub mode: Mode,
    pub templates_dir: PathBuf,
    pub source: Option<PathBuf>,
    pub monitor: usize,
    pub region: Option<Region>,
    pub interval_ms: u64,
    pub threshold: f32,
    pub use_edges: bool,
    pub send_keys: bool,
    pub key_command: Option<String>,
    pub preview: Option<PathBuf>,
    pub debug_mode: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            mode: Mode::Watch,
            templates_dir: PathBuf::from("templates"),
            source: None,
            monitor: 0,
            region: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            threshold: DEFAULT_THRESHOLD,
            use_edges: true,
            send_keys: false,
            key_command: None,
            preview: None,
            debug_mode: false,
            timeout_secs: None,
        }
    }
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    /// Parse flags (program name already stripped). Prints help, version or
    /// the problem and returns `None` when the program should not continue.
    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut parsed = Args::default();

        for arg in args {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!(
                    "Glyph Command Run v{} (built {})",
                    env!("APP_VERSION_DISPLAY"),
                    env!("APP_BUILD_YEAR")
                );
                return None;
            } else if arg == "--debug" {
                parsed.debug_mode = true;
            } else if arg == "--once" {
                parsed.mode = Mode::Once;
            } else if arg == "--no-edges" {
                parsed.use_edges = false;
            } else if arg == "--send-keys" {
                parsed.send_keys = true;
            } else if let Some(val) = arg.strip_prefix("--templates=") {
                parsed.templates_dir = PathBuf::from(val);
            } else if let Some(val) = arg.strip_prefix("--source=") {
                parsed.source = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--preview=") {
                parsed.preview = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--key-command=") {
                parsed.key_command = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--region=") {
                match Region::parse(val) {
                    Some(region) => parsed.region = Some(region),
                    None => {
                        eprintln!("❌ Invalid region '{}', expected X,Y,WIDTH,HEIGHT", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--monitor=") {
                match val.parse::<usize>() {
                    Ok(index) => parsed.monitor = index,
                    Err(_) => {
                        eprintln!("❌ Invalid monitor index: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--interval=") {
                match val.parse::<u64>() {
                    Ok(ms) => parsed.interval_ms = ms,
                    Err(_) => {
                        eprintln!("❌ Invalid interval value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--threshold=") {
                match val.parse::<f32>() {
                    Ok(t) => parsed.threshold = t,
                    Err(_) => {
                        eprintln!("❌ Invalid threshold value: {}", val);
                        return None;
                    }
                }
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                match val.parse::<u64>() {
                    Ok(secs) => parsed.timeout_secs = Some(secs),
                    Err(_) => {
                        eprintln!("❌ Invalid timeout value: {}", val);
                        return None;
                    }
                }
            } else {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            }
        }

        Some(parsed)
    }
}

fn print_help() {
    println!("🔤 Glyph Command Run");
    println!();
    println!("USAGE:");
    println!("    glyph-command-run [--source=FILE | --monitor=N] [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --source=FILE        Screenshot file re-read every cycle");
    println!("    --monitor=N          Live monitor to capture when no --source is given (default: 0)");
    println!("                         Live capture requires the 'screen-capture' build feature.");
    println!("    --region=X,Y,W,H     Region of the capture to classify (default: whole image)");
    println!("    --templates=DIR      Reference glyph directory (default: templates)");
    println!("    --interval=MS        Polling interval, 100-10000 ms (default: 800)");
    println!("    --threshold=F        Acceptance threshold for the best score (default: 0.75)");
    println!("    --no-edges           Match equalized intensities instead of edge maps");
    println!("    --send-keys          Press the mapped key for each recognized symbol");
    println!("    --key-command=CMD    Program used to press keys, key is appended (default: dry run)");
    println!("    --preview=FILE       Write the latest normalized frame to a PNG");
    println!("    --once               Classify a single capture and exit");
    println!("    --timeout=N          Auto-exit after N seconds");
    println!("    --debug              Enable debug logging");
    println!("    --help, -h           Show this help message");
    println!("    --version, -v        Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    glyph-command-run --source=screen.png --region=100,200,80,80 --once");
    println!("    glyph-command-run --source=screen.png --send-keys --key-command=\"xdotool key\"");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let parsed = Args::parse_from(&[]).unwrap();
        assert_eq!(parsed, Args::default());
        assert_eq!(parsed.interval_ms, 800);
        assert_eq!(parsed.threshold, 0.75);
        assert!(parsed.use_edges);
        assert!(!parsed.send_keys);
    }

    #[test]
    fn test_full_flag_set() {
        let parsed = Args::parse_from(&args(&[
            "--source=screen.png",
            "--monitor=2",
            "--region=10,20,30,40",
            "--templates=glyphs",
            "--interval=250",
            "--threshold=0.8",
            "--no-edges",
            "--send-keys",
            "--key-command=xdotool key",
            "--preview=last.png",
            "--once",
            "--timeout=3",
            "--debug",
        ]))
        .unwrap();

        assert_eq!(parsed.mode, Mode::Once);
        assert_eq!(parsed.source, Some(PathBuf::from("screen.png")));
        assert_eq!(parsed.monitor, 2);
        assert_eq!(parsed.region, Some(Region::new(10, 20, 30, 40)));
        assert_eq!(parsed.templates_dir, PathBuf::from("glyphs"));
        assert_eq!(parsed.interval_ms, 250);
        assert_eq!(parsed.threshold, 0.8);
        assert!(!parsed.use_edges);
        assert!(parsed.send_keys);
        assert_eq!(parsed.key_command.as_deref(), Some("xdotool key"));
        assert_eq!(parsed.preview, Some(PathBuf::from("last.png")));
        assert_eq!(parsed.timeout_secs, Some(3));
        assert!(parsed.debug_mode);
    }

    #[test]
    fn test_invalid_values_stop_parsing() {
        assert!(Args::parse_from(&args(&["--region=1,2,0,4"])).is_none());
        assert!(Args::parse_from(&args(&["--interval=fast"])).is_none());
        assert!(Args::parse_from(&args(&["--monitor=-1"])).is_none());
        assert!(Args::parse_from(&args(&["--threshold=high"])).is_none());
        assert!(Args::parse_from(&args(&["--bogus"])).is_none());
    }
}
