use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use hantag_cli::commands::{model_ops, tag_ops};
use hantag_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "hantag", about = "Korean morpheme tagger")]
struct Cli {
    /// Decoder settings TOML (overrides the embedded defaults)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Write JSON trace logs to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tag a sentence
    Tag {
        /// Model file (JSON weights or compiled)
        model_file: String,
        /// Sentence to tag
        sentence: String,
        /// Use beam search and print up to K analyses
        #[arg(long, value_name = "K", value_parser = tag_ops::parse_beam_width)]
        beam: Option<usize>,
        /// Print lattice spans instead of morpheme/tag pairs
        #[arg(long)]
        detail: bool,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
        /// User dictionary file (tag<TAB>word<TAB>weight per line)
        #[arg(long)]
        user_dict: Option<String>,
    },
    /// Tag one sentence per line and write one JSON object per line
    Batch {
        /// Model file
        model_file: String,
        /// Input file (one sentence per line)
        input_file: String,
        /// Output JSONL file
        output_file: String,
        /// Use beam search with width K
        #[arg(long, value_name = "K", value_parser = tag_ops::parse_beam_width)]
        beam: Option<usize>,
    },
    /// Score an already tagged sentence ("word/Tag word/Tag ...")
    Evaluate {
        /// Model file
        model_file: String,
        /// Tagged sentence
        tagged: String,
    },
    /// Show the lattice and the exact-search score breakdown
    Explain {
        /// Model file
        model_file: String,
        /// Sentence to explain
        sentence: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Compile a JSON weight file into the binary model format
    Compile {
        /// Input JSON weight file
        input_file: String,
        /// Output binary file
        output_file: String,
    },
    /// Show model statistics
    Info {
        /// Model file
        model_file: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());

    if let Some(path) = &cli.settings {
        let content = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading settings {}: {}", path.display(), e);
            process::exit(1);
        });
        if let Err(e) = hantag_core::settings::init_custom(content) {
            eprintln!("Error in settings {}: {}", path.display(), e);
            process::exit(1);
        }
    }

    match cli.command {
        Command::Tag {
            model_file,
            sentence,
            beam,
            detail,
            json,
            user_dict,
        } => tag_ops::tag_cmd(
            &model_file,
            &sentence,
            beam,
            detail,
            json,
            user_dict.as_deref(),
        ),
        Command::Batch {
            model_file,
            input_file,
            output_file,
            beam,
        } => tag_ops::batch_cmd(&model_file, &input_file, &output_file, beam),
        Command::Evaluate { model_file, tagged } => tag_ops::evaluate_cmd(&model_file, &tagged),
        Command::Explain {
            model_file,
            sentence,
            json,
        } => tag_ops::explain_cmd(&model_file, &sentence, json),
        Command::Compile {
            input_file,
            output_file,
        } => model_ops::compile_cmd(&input_file, &output_file),
        Command::Info { model_file, json } => model_ops::info_cmd(&model_file, json),
    }
}
