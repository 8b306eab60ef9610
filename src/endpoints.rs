//! Ordered endpoint lists with round-robin failover.
//!
//! No health scoring: rotation is triggered by the caller when a
//! connection or request fails, which spreads load across known-good
//! endpoints instead of backing off on a single flaky one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Rpc,
    Ws,
}

#[derive(Debug, Clone)]
pub struct EndpointPool {
    rpc: Vec<String>,
    ws: Vec<String>,
    rpc_index: usize,
    ws_index: usize,
}

impl EndpointPool {
    pub fn new(rpc: Vec<String>, ws: Vec<String>) -> Self {
        Self {
            rpc,
            ws,
            rpc_index: 0,
            ws_index: 0,
        }
    }

    pub fn current(&self, role: EndpointRole) -> &str {
        match role {
            EndpointRole::Rpc => &self.rpc[self.rpc_index],
            EndpointRole::Ws => &self.ws[self.ws_index],
        }
    }

    /// Advance to the next endpoint for `role`. A pool of size 1 is a no-op.
    pub fn rotate(&mut self, role: EndpointRole) {
        match role {
            EndpointRole::Rpc => {
                self.rpc_index = (self.rpc_index + 1) % self.rpc.len();
            }
            EndpointRole::Ws => {
                self.ws_index = (self.ws_index + 1) % self.ws.len();
            }
        }
    }

    pub fn len(&self, role: EndpointRole) -> usize {
        match role {
            EndpointRole::Rpc => self.rpc.len(),
            EndpointRole::Ws => self.ws.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> EndpointPool {
        EndpointPool::new(
            vec!["rpc-a".to_string(), "rpc-b".to_string(), "rpc-c".to_string()],
            vec!["ws-a".to_string()]
        )
    }

    #[test]
    fn rotation_wraps_around() {
        let mut pool = pool();
        assert_eq!(pool.current(EndpointRole::Rpc), "rpc-a");

        pool.rotate(EndpointRole::Rpc);
        assert_eq!(pool.current(EndpointRole::Rpc), "rpc-b");

        pool.rotate(EndpointRole::Rpc);
        pool.rotate(EndpointRole::Rpc);
        assert_eq!(pool.current(EndpointRole::Rpc), "rpc-a");
    }

    #[test]
    fn single_endpoint_rotation_is_a_noop() {
        let mut pool = pool();
        pool.rotate(EndpointRole::Ws);
        assert_eq!(pool.current(EndpointRole::Ws), "ws-a");
    }

    #[test]
    fn roles_rotate_independently() {
        let mut pool = pool();
        pool.rotate(EndpointRole::Rpc);
        assert_eq!(pool.current(EndpointRole::Rpc), "rpc-b");
        assert_eq!(pool.current(EndpointRole::Ws), "ws-a");
    }
}
