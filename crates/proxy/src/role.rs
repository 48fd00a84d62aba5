use std::fmt;

/// The direction a leg forwards traffic in.
///
/// Messages read on the client side are requests, messages read on the upstream side are
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ClientToUpstream,
    UpstreamToClient,
}

impl Role {
    #[inline]
    pub fn carries_requests(self) -> bool {
        matches!(self, Role::ClientToUpstream)
    }

    /// The leg running in the other direction on the same connection.
    pub fn opposite(self) -> Self {
        match self {
            Role::ClientToUpstream => Role::UpstreamToClient,
            Role::UpstreamToClient => Role::ClientToUpstream,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::ClientToUpstream => f.write_str("client->upstream"),
            Role::UpstreamToClient => f.write_str("upstream->client"),
        }
    }
}
