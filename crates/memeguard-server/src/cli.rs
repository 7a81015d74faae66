use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "memeguard-server")]
#[command(
    author,
    version,
    about = "Offensive-content classification endpoint for (image, text) pairs",
    long_about = None
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEMEGUARD_CONFIG", default_value = "memeguard.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "MEMEGUARD_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "MEMEGUARD_PORT")]
    pub port: Option<u16>,

    /// Pretrained weights file (.pth or .safetensors)
    #[arg(short, long, env = "MEMEGUARD_WEIGHTS")]
    pub weights: Option<PathBuf>,

    /// Local tokenizer.json
    #[arg(long, env = "MEMEGUARD_TOKENIZER_FILE", conflicts_with = "tokenizer_repo")]
    pub tokenizer_file: Option<PathBuf>,

    /// HuggingFace repository providing tokenizer.json
    #[arg(long, env = "MEMEGUARD_TOKENIZER_REPO")]
    pub tokenizer_repo: Option<String>,

    /// Inference device (cpu, cuda, cuda:N, metal)
    #[arg(short, long, env = "MEMEGUARD_DEVICE")]
    pub device: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
