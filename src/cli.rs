//! Command-line arguments.

use clap::Parser;

use crate::config::{parse_port, CaptureConfig, ProtocolMask};
use crate::domain::TransportProtocol;
use crate::error::ConfigError;

/// Count raw IPv4 UDP/TCP packets arriving at this host.
#[derive(Parser, Debug)]
#[command(name = "rawsniff")]
#[command(about = "Raw socket sniffer - counts UDP/TCP packets until interrupted")]
pub struct Cli {
    /// Only count packets sent to this destination port
    #[arg(short, long, env = "RAWSNIFF_PORT", value_parser = parse_port)]
    pub port: Option<u16>,

    /// Protocol to listen for (udp or tcp, any case); repeat for both. Default: both
    #[arg(
        short = 'P',
        long = "protocol",
        env = "RAWSNIFF_PROTOCOL",
        value_delimiter = ',',
        value_parser = parse_protocol
    )]
    pub protocols: Vec<TransportProtocol>,

    /// Only count packets whose payload contains this text
    #[arg(short, long, env = "RAWSNIFF_WORD")]
    pub word: Option<String>,

    /// Network interface to bind the sockets to (e.g., eth0)
    #[arg(short, long, env = "RAWSNIFF_INTERFACE")]
    pub interface: Option<String>,

    /// Diagnostics level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

fn parse_protocol(value: &str) -> Result<TransportProtocol, ConfigError> {
    value.parse()
}

impl Cli {
    /// Turn the parsed arguments into a capture configuration.
    pub fn into_config(self) -> Result<CaptureConfig, ConfigError> {
        CaptureConfig::new()
            .with_port(self.port)
            .with_protocols(ProtocolMask::from_protocols(&self.protocols))
            .with_word_filter(self.word.filter(|word| !word.is_empty()))
            .with_interface(self.interface)
            .validate()
    }
}
