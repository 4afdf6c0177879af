use std::num::NonZeroU16;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
pub struct Cli {
    #[clap(short, long, default_value = "8787", env = "PICSTASH_PORT")]
    pub port: NonZeroU16,

    #[clap(long, default_value = "127.0.0.1", env = "PICSTASH_HOST")]
    pub host: String,

    /// Directory backing the object store
    #[clap(short, long, default_value = "./data", env = "PICSTASH_ROOT_DIR")]
    pub root_dir: PathBuf,

    #[clap(long, env = "PICSTASH_ADMIN_USER")]
    pub admin_user: String,

    #[clap(long, env = "PICSTASH_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,
}
