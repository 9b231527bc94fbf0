//! REST backend client
//!
//! Blocking client for a PostgREST-style backend: row filters in the query
//! string, a stored procedure for the atomic XP increment, and unique
//! constraints reported as HTTP 409. All requests carry the project API key
//! and a 10 second timeout; expiry surfaces as a retryable transport error.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{DataService, LeaderboardEntry, Profile, ProfileUpdate, ServiceError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const PROFILE_COLS: &str =
    "wallet_address,username,twitter_handle,discord_handle,xp,referral_code,referred_by";

pub struct RestService {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct QuestRow {
    quest_id: String,
}

impl RestService {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, ServiceError> {
        let resp = self
            .authed(req)
            .send()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(resp),
            StatusCode::CONFLICT => Err(ServiceError::Conflict),
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound),
            s => Err(ServiceError::Transport(format!("HTTP {}", s))),
        }
    }
}

impl DataService for RestService {
    fn fetch_profile(&self, address: &str) -> Result<Option<Profile>, ServiceError> {
        let filter = format!("eq.{}", address);
        let req = self.client.get(self.url("users")).query(&[
            ("select", PROFILE_COLS),
            ("wallet_address", filter.as_str()),
        ]);
        let rows: Vec<Profile> = self
            .send(req)?
            .json()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    fn insert_profile(&self, address: &str) -> Result<Profile, ServiceError> {
        let req = self
            .client
            .post(self.url("users"))
            .header("Prefer", "return=representation")
            .query(&[("select", PROFILE_COLS)])
            .json(&json!({ "wallet_address": address }));
        match self.send(req) {
            Ok(resp) => {
                let rows: Vec<Profile> = resp
                    .json()
                    .map_err(|e| ServiceError::Transport(e.to_string()))?;
                rows.into_iter().next().ok_or(ServiceError::NotFound)
            }
            // Concurrent first sight: somebody else inserted the row, re-read
            Err(ServiceError::Conflict) => {
                self.fetch_profile(address)?.ok_or(ServiceError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    fn update_profile(&self, address: &str, update: &ProfileUpdate) -> Result<(), ServiceError> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &update.username {
            body.insert("username".into(), json!(name));
        }
        if let Some(handle) = &update.twitter_handle {
            body.insert("twitter_handle".into(), json!(handle));
        }
        if let Some(handle) = &update.discord_handle {
            body.insert("discord_handle".into(), json!(handle));
        }
        if let Some(code) = &update.referred_by {
            let code = code.trim();
            if !code.is_empty() {
                // First write wins: only patch rows whose referrer is null
                if let Some(existing) = self.fetch_profile(address)? {
                    if existing.referred_by.is_none() {
                        body.insert("referred_by".into(), json!(code));
                    }
                }
            }
        }
        if body.is_empty() {
            return Ok(());
        }
        let filter = format!("eq.{}", address);
        let req = self
            .client
            .patch(self.url("users"))
            .query(&[("wallet_address", filter.as_str())])
            .json(&body);
        self.send(req).map(|_| ())
    }

    fn list_completions(&self, address: &str) -> Result<HashSet<String>, ServiceError> {
        let filter = format!("eq.{}", address);
        let req = self.client.get(self.url("user_quests")).query(&[
            ("select", "quest_id"),
            ("wallet_address", filter.as_str()),
        ]);
        let rows: Vec<QuestRow> = self
            .send(req)?
            .json()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(rows.into_iter().map(|r| r.quest_id).collect())
    }

    fn insert_completion(
        &self,
        address: &str,
        quest_id: &str,
        submission: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut body = json!({
            "wallet_address": address,
            "quest_id": quest_id,
        });
        if let Some(data) = submission {
            body["submission_data"] = json!(data);
        }
        let req = self.client.post(self.url("user_quests")).json(&body);
        self.send(req).map(|_| ())
    }

    fn increment_xp(&self, address: &str, amount: u64) -> Result<(), ServiceError> {
        let req = self.client.post(self.url("rpc/add_xp")).json(&json!({
            "user_wallet": address,
            "xp_amount": amount,
        }));
        self.send(req).map(|_| ())
    }

    fn count_referrals_by_code(&self, code: &str) -> Result<u32, ServiceError> {
        let filter = format!("eq.{}", code);
        let req = self.client.get(self.url("users")).query(&[
            ("select", "wallet_address"),
            ("referred_by", filter.as_str()),
        ]);
        let rows: Vec<serde_json::Value> = self
            .send(req)?
            .json()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(rows.len() as u32)
    }

    fn assign_referral_code(&self, address: &str) -> Result<String, ServiceError> {
        // Code generation and collision retry live in the backend procedure;
        // every other strategy is unsafe under concurrent signups
        let req = self
            .client
            .post(self.url("rpc/assign_referral_code"))
            .json(&json!({ "user_wallet": address }));
        let code: String = self
            .send(req)?
            .json()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(code)
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let limit = limit.to_string();
        let req = self.client.get(self.url("users")).query(&[
            ("select", "wallet_address,username,twitter_handle,xp"),
            ("order", "xp.desc"),
            ("limit", limit.as_str()),
        ]);
        self.send(req)?
            .json()
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}
