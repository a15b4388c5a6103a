// Endpoint wrappers for the miner control API.
//
// Each method fixes the body shape and executor policy for one endpoint.
// The two setters carry their endpoint-specific quirks: a 401 hands
// recovery back to the caller, and an "already in" rejection is a no-op
// rather than a failure.

use crate::client::{MinerClient, RequestOptions};
use crate::model::{AddrBody, CurtailBody, CurtailMode, MinerAddr, Profile, ProfileBody};
use crate::outcome::RequestOutcome;

/// Error substrings the setters treat as "already applied" and ignore.
const ALREADY_SET: &[&str] = &["Miner is already in"];

impl MinerClient {
    /// `POST /login` with the miner's address.
    pub async fn login(&self, miner: &MinerAddr, max_attempts: u32) -> RequestOutcome {
        let body = AddrBody { miner_ip: miner.as_str() };
        self.execute("login", &body, &RequestOptions::new(max_attempts))
            .await
    }

    /// `POST /logout` with the miner's address. Idempotent server-side.
    pub async fn logout(&self, miner: &MinerAddr, max_attempts: u32) -> RequestOutcome {
        let body = AddrBody { miner_ip: miner.as_str() };
        self.execute("logout", &body, &RequestOptions::new(max_attempts))
            .await
    }

    /// `POST /profileset` with a session token.
    pub async fn set_profile(
        &self,
        token: &str,
        profile: Profile,
        max_attempts: u32,
    ) -> RequestOutcome {
        let body = ProfileBody { token, profile };
        let options = RequestOptions {
            relogin_on_unauthorized: true,
            ignorable_errors: ALREADY_SET,
            ..RequestOptions::new(max_attempts)
        };
        self.execute("profileset", &body, &options).await
    }

    /// `POST /curtail` with a session token.
    pub async fn set_curtail(
        &self,
        token: &str,
        mode: CurtailMode,
        max_attempts: u32,
    ) -> RequestOutcome {
        let body = CurtailBody { token, mode };
        let options = RequestOptions {
            relogin_on_unauthorized: true,
            ignorable_errors: ALREADY_SET,
            ..RequestOptions::new(max_attempts)
        };
        self.execute("curtail", &body, &options).await
    }
}
