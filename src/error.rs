use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// A configured collaborator could not be set up (client binary missing,
    /// database unreachable, template broken...).
    #[display("could not set up {_0}")]
    Setup(#[error(not(source))] &'static str),
    #[display("pass failed")]
    Pass,
    #[display("issue with the snapshot memory")]
    Memory,
    #[display("could not start the async runtime")]
    Runtime,
}
