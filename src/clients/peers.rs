//! Reading peers out of `wg0.conf`

/// A `[Peer]` section of the WireGuard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peer {
    pub public_key: Option<String>,
    pub preshared_key: Option<String>,
    pub allowed_ips: Option<String>,
}

/// Parse every `[Peer]` section; keys in other sections are ignored
pub fn parse_peers(text: &str) -> Vec<Peer> {
    let mut peers = Vec::new();
    let mut current: Option<Peer> = None;

    for line in text.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            if let Some(peer) = current.take() {
                peers.push(peer);
            }
            if line == "[Peer]" {
                current = Some(Peer::default());
            }
            continue;
        }

        let Some(peer) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = Some(value.trim().to_string());

        match key.trim() {
            "PublicKey" => peer.public_key = value,
            "PresharedKey" => peer.preshared_key = value,
            "AllowedIPs" => peer.allowed_ips = value,
            _ => {}
        }
    }

    if let Some(peer) = current {
        peers.push(peer);
    }

    peers
}
