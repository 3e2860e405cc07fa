use clap::{Parser, Subcommand};

/// Transforms a workbook of socioeconomic indicators into the JSON documents
/// consumed by the static dashboard, and serves the result.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reads every sheet of the workbook, normalizes the rows into indicator
    /// records and writes the consolidated dataset, the run summary and the
    /// indicator mapping as JSON.
    Transform {
        /// (file path) The workbook (.xlsx) holding one sheet per indicator.
        #[clap(short, long, value_parser)]
        input: String,

        /// (file path, optional) A JSON file describing the indicator
        /// framework: metadata entries plus classifier overrides. The
        /// built-in 17-indicator framework is used when not provided.
        #[clap(short, long, value_parser)]
        framework: Option<String>,

        /// (directory path) Where the JSON documents are written.
        #[clap(short, long, value_parser, default_value = "transformed_data")]
        out_dir: String,
    },

    /// Prints the structure of the workbook: per sheet the shape, the column
    /// names and apparent types, missing-cell counts and the roles the
    /// classifier would assign.
    Inspect {
        /// (file path) The workbook (.xlsx) to examine.
        #[clap(short, long, value_parser)]
        input: String,

        /// (file path, optional) If specified, the analysis is also written
        /// as a JSON document to this location.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Serves the working directory over plain HTTP so the dashboard can
    /// load its assets and the generated JSON.
    Serve {
        /// (directory path) The directory to serve.
        #[clap(short, long, value_parser, default_value = ".")]
        dir: String,

        /// The port to listen on.
        #[clap(short, long, value_parser, default_value_t = 8080)]
        port: u16,
    },

    /// Compares a generated consolidated dataset against a reference file
    /// and fails on any difference.
    Check {
        /// (file path) The generated consolidated dataset.
        #[clap(short, long, value_parser)]
        input: String,

        /// (file path) The reference dataset to compare against.
        #[clap(short, long, value_parser)]
        reference: String,
    },
}
