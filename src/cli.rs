use std::{collections::BTreeMap, fmt::Display, io::Write, str::FromStr};

use argh::FromArgs;
use log::{debug, info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::{
    clock::ManualClock,
    config::{self, LipSyncConfig},
    generator::{self, TimelineGenerator},
    model::{Viseme, VisemeTimeline},
    puppets::{self, puppet_3d::Puppet3d, Puppet},
    receivers::lip_sync::{LipSync, Tick},
    voice::{self, Gender, VoiceInfo, VoicePreference},
};

const DEFAULT_FPS: u32 = 60;

#[derive(Debug)]
pub enum CliError {
    ParseFailure(argh::EarlyExit),
    UnknownFormat { input: String },
    InvalidFps(u32),
    Config(config::Error),
    Puppet(puppets::Error),
    Generator(generator::Error),
    Output(std::io::Error),
    Serialize(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure(e) => write!(f, "{e:?}"),
            Self::UnknownFormat { input } => write!(f, "Unknown output format: {input}"),
            Self::InvalidFps(v) => write!(f, "Frames per second must be at least 1, got {v}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Puppet(e) => write!(f, "{e}"),
            Self::Generator(e) => write!(f, "{e}"),
            Self::Output(e) => write!(f, "Unable to write output: {e}"),
            Self::Serialize(e) => write!(f, "Unable to serialize output: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<config::Error> for CliError {
    fn from(value: config::Error) -> Self {
        Self::Config(value)
    }
}

impl From<puppets::Error> for CliError {
    fn from(value: puppets::Error) -> Self {
        Self::Puppet(value)
    }
}

impl From<generator::Error> for CliError {
    fn from(value: generator::Error) -> Self {
        Self::Generator(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

type Result<T> = std::result::Result<T, CliError>;

/// lipsync command line interface
#[derive(Debug, FromArgs)]
pub struct Args {
    /// enable verbose logging, overridden by "quiet" if passed
    #[argh(switch, short = 'v', long = "verbose")]
    verbose: bool,
    /// disable all logging, overrides verbose
    #[argh(switch, short = 'q', long = "quiet")]
    quiet: bool,
    #[argh(subcommand)]
    commands: Option<Commands>,
}

impl Args {
    /// Parse some `args`, not including the program name.
    pub fn parse(args: &[&str]) -> Result<Self> {
        Self::from_args(&[env!("CARGO_PKG_NAME")], args).map_err(CliError::ParseFailure)
    }

    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Run the subcommand, writing results to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.commands {
            Some(Commands::Timeline(c)) => c.run(out),
            Some(Commands::Simulate(c)) => c.run(out),
            Some(Commands::Voices(c)) => c.run(out),
            None => {
                info!("No command given, try --help");
                Ok(())
            }
        }
    }
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub enum Commands {
    Timeline(TimelineCommand),
    Simulate(SimulateCommand),
    Voices(VoicesCommand),
}

fn load_config(path: Option<&str>) -> Result<LipSyncConfig> {
    match path {
        Some(v) => {
            debug!("Loading config from {v}");
            Ok(LipSyncConfig::load(v)?)
        }
        None => Ok(LipSyncConfig::default()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "table" => Ok(Self::Pretty),
            _ => Err(CliError::UnknownFormat {
                input: s.to_string(),
            }),
        }
    }
}

impl AsRef<str> for OutputFormat {
    fn as_ref(&self) -> &str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Pretty => "pretty",
        }
    }
}

/// Print the viseme timeline for some text
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "timeline")]
pub struct TimelineCommand {
    /// text to generate timelines for, one timeline per argument
    #[argh(positional)]
    texts: Vec<String>,
    /// speech rate multiplier, defaults to the configured rate
    #[argh(option)]
    rate: Option<f32>,
    /// path to a JSON config
    #[argh(option)]
    config: Option<String>,
    /// output format, either json or pretty
    #[argh(option, default = "OutputFormat::Json")]
    format: OutputFormat,
}

impl TimelineCommand {
    fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let rate = self.rate.unwrap_or(config.default_speech_rate);
        let generator = TimelineGenerator::new(config.timing);

        let timelines = generator.generate_batch(&self.texts, rate)?;

        for (text, timeline) in self.texts.iter().zip(timelines.iter()) {
            match self.format {
                OutputFormat::Json => {
                    serde_json::to_writer(&mut *out, timeline)?;
                    writeln!(out)?;
                }
                OutputFormat::Pretty => write_pretty(out, text, timeline)?,
            }
        }

        Ok(())
    }
}

fn write_pretty<W: Write>(out: &mut W, text: &str, timeline: &VisemeTimeline) -> Result<()> {
    writeln!(out, "{text:?} ({:.1}ms)", timeline.duration_ms())?;
    for event in timeline {
        writeln!(
            out,
            "  {:>9.2} {:>9.2}  {:<3} {:.1}",
            event.start,
            event.end,
            event.viseme.as_ref(),
            event.intensity
        )?;
    }

    Ok(())
}

/// Animate a puppet for some text and print every frame
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "simulate")]
pub struct SimulateCommand {
    /// text to speak
    #[argh(positional)]
    text: String,
    /// path to the puppet description
    #[argh(option)]
    model: String,
    /// speech rate multiplier, defaults to the configured rate
    #[argh(option)]
    rate: Option<f32>,
    /// frames per second
    #[argh(option, default = "DEFAULT_FPS")]
    fps: u32,
    /// path to a JSON config
    #[argh(option)]
    config: Option<String>,
    /// seed for mouth movement variation, random if not set
    #[argh(option)]
    seed: Option<u64>,
}

/// One line of `simulate` output.
#[derive(Debug, Serialize)]
struct Frame<'a> {
    frame: u64,
    elapsed_ms: f64,
    viseme: Viseme,
    intensity: f32,
    weights: BTreeMap<&'a str, f32>,
}

impl SimulateCommand {
    fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.fps == 0 {
            return Err(CliError::InvalidFps(self.fps));
        }

        let config = load_config(self.config.as_deref())?;
        let mut puppet = Puppet3d::load(&self.model)?;

        let rng = match self.seed {
            Some(v) => StdRng::seed_from_u64(v),
            None => StdRng::from_entropy(),
        };
        let clock = ManualClock::default();
        let mut lip_sync = LipSync::with_rng(config, &clock, rng);

        if !lip_sync.speak(&self.text, self.rate)? {
            info!("Nothing to say");
            return Ok(());
        }

        let frame_ms = 1000.0 / f64::from(self.fps);
        let mut frame = 0;
        while let Tick::Speaking(sample) = puppet.visit_lip_sync(&mut lip_sync) {
            let line = Frame {
                frame,
                elapsed_ms: sample.elapsed_ms,
                viseme: sample.viseme,
                intensity: sample.intensity,
                weights: puppet.channels().values(),
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;

            frame += 1;
            clock.advance(frame_ms);
        }

        debug!("Simulated {frame} frames for {}", puppet.name());

        Ok(())
    }
}

/// Show which voice would be chosen from a list
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "voices")]
pub struct VoicesCommand {
    /// names of the available voices, in the order the backend lists them
    #[argh(positional)]
    names: Vec<String>,
    /// mark an available voice as female, can be repeated
    #[argh(option)]
    female: Vec<String>,
    /// exact name of the voice to prefer
    #[argh(option)]
    prefer: Option<String>,
}

impl VoicesCommand {
    fn run<W: Write>(&self, out: &mut W) -> Result<()> {
        let voices = self
            .names
            .iter()
            .map(|name| {
                let voice = VoiceInfo::new(name.as_str());
                if self.female.contains(name) {
                    voice.with_gender(Gender::Female)
                } else {
                    voice
                }
            })
            .collect::<Vec<_>>();

        let mut preference = VoicePreference::default();
        if let Some(v) = &self.prefer {
            preference.preferred_name = v.clone();
        }

        match voice::select_voice(&voices, &preference) {
            Some((voice, reason)) => writeln!(out, "{} ({reason})", voice.name)?,
            None => writeln!(out, "No voices available")?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Result<String> {
        let mut out = Vec::new();
        Args::parse(args)?.run(&mut out)?;

        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parse() {
        let args = Args::parse(&["--verbose"]).unwrap();

        assert_eq!(args.verbose, true);
        assert_eq!(args.quiet, false);
        assert_eq!(args.level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn empty() {
        let args = Args::from_args(&["lipsync"], &[]).unwrap();

        assert_eq!(args.verbose, false);
        assert_eq!(args.quiet, false);
        assert!(args.commands.is_none());
        assert_eq!(args.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn no_command_quiet_verbose() {
        let args = Args::from_args(&["lipsync"], &["--quiet", "--verbose"]).unwrap();

        assert_eq!(args.verbose, true);
        assert_eq!(args.quiet, true);
        assert_eq!(args.level_filter(), LevelFilter::Off);
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            Args::parse(&["speak", "hello"]),
            Err(CliError::ParseFailure(_))
        ));
    }

    mod timeline {
        use super::*;

        #[test]
        fn defaults() {
            let args = Args::from_args(&["lipsync"], &["timeline", "hello"]).unwrap();

            match args.commands.unwrap() {
                Commands::Timeline(v) => {
                    assert_eq!(v.texts, vec!["hello"]);
                    assert!(v.rate.is_none());
                    assert!(v.config.is_none());
                    assert_eq!(v.format, OutputFormat::Json);
                }
                _ => assert!(false),
            }
        }

        #[test]
        fn format_ignore_case() {
            let args =
                Args::from_args(&["lipsync"], &["timeline", "hi", "--format", "PrEtTy"]).unwrap();

            match args.commands.unwrap() {
                Commands::Timeline(v) => assert_eq!(v.format, OutputFormat::Pretty),
                _ => assert!(false),
            }
        }

        #[test]
        fn unknown_format() {
            let args = Args::from_args(&["lipsync"], &["timeline", "hi", "--format", "xml"]);

            assert!(args.is_err());
        }

        #[test]
        fn json_per_text() {
            let out = run(&["timeline", "hi", "hello world", "--rate", "1"]).unwrap();
            let lines = out.lines().collect::<Vec<_>>();

            assert_eq!(lines.len(), 2);

            let first: VisemeTimeline = serde_json::from_str(lines[0]).unwrap();
            let expected = generator::generate_timeline("hi", 1.0).unwrap();
            assert_eq!(
                first.iter().map(|v| v.viseme).collect::<Vec<_>>(),
                expected.iter().map(|v| v.viseme).collect::<Vec<_>>()
            );
            assert_eq!(first.duration_ms(), 525.0);
            assert!(lines[1].contains("\"viseme\":\"O\""));
        }

        #[test]
        fn pretty() {
            let out = run(&["timeline", "hi", "--rate", "1", "--format", "pretty"]).unwrap();

            assert!(out.starts_with("\"hi\" (525.0ms)"));
            assert_eq!(out.lines().count(), 3);
            assert!(out.contains(" sil "));
            assert!(out.contains(" I "));
        }

        #[test]
        fn invalid_rate() {
            assert!(matches!(
                run(&["timeline", "hi", "--rate", "0"]),
                Err(CliError::Generator(_))
            ));
        }

        #[test]
        fn missing_config() {
            assert!(matches!(
                run(&["timeline", "hi", "--config", "/definitely/not/config.json"]),
                Err(CliError::Config(config::Error::Io(_)))
            ));
        }
    }

    mod simulate {
        use super::*;

        fn model_path(name: &str) -> String {
            let path = std::env::temp_dir()
                .join(format!("lipsync-{name}-{}.json", std::process::id()));
            std::fs::write(
                &path,
                r#"{
                    "name": "Test",
                    "meshes": [{
                        "name": "Head",
                        "blend_shapes": [{ "name": "mouthOpen" }, { "name": "jawOpen" }]
                    }]
                }"#,
            )
            .unwrap();

            path.to_string_lossy().to_string()
        }

        #[test]
        fn requires_model() {
            let args = Args::from_args(&["lipsync"], &["simulate", "hello"]);

            assert!(args.is_err());
        }

        #[test]
        fn frames_until_done() {
            let path = model_path("frames");
            let out = run(&[
                "simulate", "hi", "--model", &path, "--rate", "1", "--fps", "10", "--seed", "7",
            ])
            .unwrap();

            // 525ms at 100ms a frame
            let frames = out.lines().collect::<Vec<_>>();
            assert_eq!(frames.len(), 6);

            let last: serde_json::Value = serde_json::from_str(frames[5]).unwrap();
            assert_eq!(last["frame"], 5);
            assert_eq!(last["viseme"], "I");
            assert!(last["weights"]["jawOpen"].as_f64().unwrap() > 0.0);

            let _ = std::fs::remove_file(path);
        }

        #[test]
        fn same_seed_same_frames() {
            let path = model_path("seeded");
            let args = ["simulate", "hello there", "--model", &path, "--seed", "11"];

            assert_eq!(run(&args).unwrap(), run(&args).unwrap());

            let _ = std::fs::remove_file(path);
        }

        #[test]
        fn nothing_to_say() {
            let path = model_path("silent");
            let out = run(&["simulate", "...", "--model", &path]).unwrap();

            assert!(out.is_empty());

            let _ = std::fs::remove_file(path);
        }

        #[test]
        fn zero_fps() {
            let path = model_path("zero-fps");

            assert!(matches!(
                run(&["simulate", "hi", "--model", &path, "--fps", "0"]),
                Err(CliError::InvalidFps(0))
            ));

            let _ = std::fs::remove_file(path);
        }

        #[test]
        fn missing_model() {
            assert!(matches!(
                run(&["simulate", "hi", "--model", "/definitely/not/model.json"]),
                Err(CliError::Puppet(puppets::Error::Io(_)))
            ));
        }
    }

    mod voices {
        use super::*;

        #[test]
        fn name_hint() {
            let out = run(&["voices", "Microsoft David", "Microsoft Zira"]).unwrap();

            assert_eq!(out, "Microsoft Zira (name suggests a female voice)\n");
        }

        #[test]
        fn marked_female() {
            let out = run(&["voices", "Alex", "Karen", "--female", "Karen"]).unwrap();

            assert_eq!(out, "Karen (reported as female)\n");
        }

        #[test]
        fn prefer() {
            let out = run(&["voices", "Alex", "Karen", "--female", "Karen", "--prefer", "Alex"])
                .unwrap();

            assert_eq!(out, "Alex (preferred voice)\n");
        }

        #[test]
        fn none() {
            assert_eq!(run(&["voices"]).unwrap(), "No voices available\n");
        }
    }
}
