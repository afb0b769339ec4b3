//! Enode URLs.

use std::{fmt, net::IpAddr, str::FromStr};
use url::Url;

/// Length of the hex encoded node public key.
pub const NODE_ID_LENGTH: usize = 128;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnodeError {
    #[error("invalid URL scheme, want \"enode\"")]
    InvalidScheme,
    #[error("invalid node id")]
    InvalidId,
    #[error("missing host")]
    MissingHost,
    #[error("Hostname not supported in the network")]
    HostName(String),
    #[error("invalid port")]
    InvalidPort,
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// A parsed `enode://<id>@<ip>:<port>?discport=<n>&raftport=<n>` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enode {
    /// Lower case hex of the node public key.
    pub id: String,
    pub ip: IpAddr,
    pub port: u16,
    pub discport: Option<u16>,
    pub raftport: Option<u16>,
}

impl Enode {
    pub fn parse(s: &str) -> Result<Self, EnodeError> {
        s.parse()
    }

    /// Renders the URL the way node URLs are stored in the contracts.
    pub fn url(&self) -> String {
        let ip = match self.ip {
            IpAddr::V4(ip) => ip.to_string(),
            IpAddr::V6(ip) => format!("[{ip}]"),
        };
        node_url(&self.id, &ip, self.port, self.raftport.unwrap_or_default(), self.raftport.is_some())
    }
}

impl FromStr for Enode {
    type Err = EnodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s.trim())?;
        if url.scheme() != "enode" {
            return Err(EnodeError::InvalidScheme);
        }

        let id = url.username();
        if id.len() != NODE_ID_LENGTH || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(EnodeError::InvalidId);
        }

        let host = url.host_str().filter(|h| !h.is_empty()).ok_or(EnodeError::MissingHost)?;
        let ip = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map_err(|_| EnodeError::HostName(host.to_string()))?;
        let port = url.port().ok_or(EnodeError::InvalidPort)?;

        let mut discport = None;
        let mut raftport = None;
        for (key, value) in url.query_pairs() {
            let value = value.parse::<u16>().map_err(|_| EnodeError::InvalidPort);
            match key.as_ref() {
                "discport" => discport = Some(value?),
                "raftport" => raftport = Some(value?),
                _ => {}
            }
        }

        Ok(Self { id: id.to_lowercase(), ip, port, discport, raftport })
    }
}

impl fmt::Display for Enode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Builds a node URL, trimming NUL padding off the ip.
pub fn node_url(id: &str, ip: &str, port: u16, raftport: u16, is_raft: bool) -> String {
    let ip = ip.trim_matches('\0');
    if is_raft {
        format!("enode://{id}@{ip}:{port}?discport=0&raftport={raftport}")
    } else {
        format!("enode://{id}@{ip}:{port}?discport=0")
    }
}

/// Returns the node id of an enode URL, if it parses.
pub fn node_id(url: &str) -> Option<String> {
    Enode::parse(url).ok().map(|enode| enode.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "ac6b1096ca56b9f6d004b779ae3728bf83f8e22453404cc3cef16a3d9b96608bc67c4b30db88e0a5a6c6390213f7acbe1153ff6d23ce57380104288ae19373ef";

    #[test]
    fn parses_enode() {
        let url = format!("enode://{ID}@127.0.0.1:21000?discport=0&raftport=50401");
        let enode = Enode::parse(&url).unwrap();
        assert_eq!(enode.id, ID);
        assert_eq!(enode.ip, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(enode.port, 21000);
        assert_eq!(enode.discport, Some(0));
        assert_eq!(enode.raftport, Some(50401));
        assert_eq!(enode.to_string(), url);
    }

    #[test]
    fn lowercases_id() {
        let url = format!("enode://{}@10.0.0.1:30303", ID.to_uppercase());
        assert_eq!(node_id(&url).as_deref(), Some(ID));
        assert_eq!(
            Enode::parse(&url).unwrap().url(),
            format!("enode://{ID}@10.0.0.1:30303?discport=0")
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert_eq!(
            Enode::parse(&format!("http://{ID}@127.0.0.1:21000")),
            Err(EnodeError::InvalidScheme)
        );
        assert_eq!(Enode::parse("enode://abcd@127.0.0.1:21000"), Err(EnodeError::InvalidId));
        assert_eq!(
            Enode::parse(&format!("enode://{ID}@127.0.0.1")),
            Err(EnodeError::InvalidPort)
        );
        assert_eq!(
            Enode::parse(&format!("enode://{ID}@node1.example.com:21000")),
            Err(EnodeError::HostName("node1.example.com".to_string()))
        );
        assert!(Enode::parse("not a url").is_err());
        assert_eq!(node_id("enode://"), None);
    }

    #[test]
    fn builds_node_url() {
        assert_eq!(
            node_url(ID, "127.0.0.1\0\0\0", 21000, 0, false),
            format!("enode://{ID}@127.0.0.1:21000?discport=0")
        );
        assert_eq!(
            node_url(ID, "127.0.0.1", 21000, 50401, true),
            format!("enode://{ID}@127.0.0.1:21000?discport=0&raftport=50401")
        );
    }
}
