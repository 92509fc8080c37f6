pub type Result<T> = std::result::Result<T, NetInfoError>;

#[derive(Debug, thiserror::Error)]
pub enum NetInfoError {
    #[error("failed to enumerate interfaces: {0}")]
    Interfaces(#[from] nix::Error),

    #[error("failed to read routing table {path}: {source}")]
    RouteTable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
