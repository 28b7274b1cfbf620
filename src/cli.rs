use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// UiGround command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to uiground.toml next to the binary or in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect candidate UI regions and write the numbered overlay
    Detect {
        /// Screenshot to analyse (png, jpg, bmp, webp, …)
        #[arg(long, value_name = "IMAGE")]
        input: PathBuf,

        /// Where to write the annotated image
        #[arg(long, value_name = "IMAGE")]
        output: Option<PathBuf>,
    },

    /// Resolve a free-form model answer into a normalized box
    Resolve {
        /// Width of the described image in pixels
        #[arg(long)]
        width: u32,

        /// Height of the described image in pixels
        #[arg(long)]
        height: u32,

        /// Answer text
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        /// File holding the answer text
        #[arg(long, value_name = "FILE")]
        text_file: Option<PathBuf>,
    },

    /// Detect regions, then map an element-id answer onto them
    Element {
        #[arg(long, value_name = "IMAGE")]
        input: PathBuf,

        /// Answer naming an element number, e.g. "element 3"
        #[arg(long)]
        text: String,
    },

    /// Overlay the normalized-coordinate reference grid
    Grid {
        #[arg(long, value_name = "IMAGE")]
        input: PathBuf,

        #[arg(long, value_name = "IMAGE")]
        output: PathBuf,

        /// Grid spacing in pixels (overrides the config)
        #[arg(long)]
        grid_size: Option<u32>,
    },

    /// Run the direct scheme with the dataset-backed mock predictor
    Ground {
        #[arg(long, value_name = "IMAGE")]
        input: PathBuf,

        #[arg(long)]
        instruction: String,

        /// Dataset JSON (overrides [predictor].dataset)
        #[arg(long, value_name = "FILE")]
        dataset: Option<PathBuf>,
    },
}
