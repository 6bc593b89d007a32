pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("identity cannot be empty")]
    EmptyIdentity,

    #[error("failed to write rights xml")]
    Write(#[from] std::io::Error),

    #[error("rights xml error")]
    Xml(#[from] quick_xml::Error),

    #[error("rights xml is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
