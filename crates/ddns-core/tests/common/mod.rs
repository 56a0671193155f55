//! Test doubles and common utilities for contract tests
//!
//! The doubles keep everything in memory and count every call, so tests can
//! assert exactly which provider operations a reconciliation issued.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpResolver, RecordRequest};
use ddns_core::{DdnsConfig, DomainSpec};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A create or edit call as observed by the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    Create {
        domain: String,
        request: RecordRequest,
    },
    Edit {
        domain: String,
        id: u64,
        request: RecordRequest,
    },
}

/// In-memory provider that tracks calls
///
/// Clones share state, so one handle can be given to the engine while the
/// test keeps another for assertions.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    records: Arc<Mutex<HashMap<String, Vec<DnsRecord>>>>,
    list_calls: Arc<AtomicUsize>,
    writes: Arc<Mutex<Vec<WriteCall>>>,
    failing_lists: Arc<Mutex<HashSet<String>>>,
    failing_writes: Arc<Mutex<HashSet<String>>>,
    next_id: Arc<AtomicU64>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.next_id.store(1000, Ordering::SeqCst);
        provider
    }

    /// Seed an existing record
    pub fn with_record(
        self,
        domain: &str,
        id: u64,
        record_type: &str,
        name: &str,
        data: &str,
    ) -> Self {
        self.records
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(DnsRecord {
                id,
                record_type: record_type.to_string(),
                name: name.to_string(),
                data: data.to_string(),
                ttl: Some(1800),
            });
        self
    }

    /// Make `list_records` fail for `domain`
    pub fn failing_list_for(self, domain: &str) -> Self {
        self.failing_lists.lock().unwrap().insert(domain.to_string());
        self
    }

    /// Make create and edit fail for `domain`
    pub fn failing_writes_for(self, domain: &str) -> Self {
        self.failing_writes.lock().unwrap().insert(domain.to_string());
        self
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// All create/edit calls, in the order they were issued
    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<WriteCall> {
        self.writes()
            .into_iter()
            .filter(|w| matches!(w, WriteCall::Create { .. }))
            .collect()
    }

    pub fn edits(&self) -> Vec<WriteCall> {
        self.writes()
            .into_iter()
            .filter(|w| matches!(w, WriteCall::Edit { .. }))
            .collect()
    }

    /// Current records of `domain`
    pub fn records(&self, domain: &str) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    /// Total provider calls of any kind
    pub fn total_calls(&self) -> usize {
        self.list_call_count() + self.writes().len()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_lists.lock().unwrap().contains(domain) {
            return Err(Error::provider("mock", format!("list failed for {}", domain)));
        }

        Ok(self.records(domain))
    }

    async fn create_record(&self, domain: &str, request: &RecordRequest) -> Result<DnsRecord> {
        self.writes.lock().unwrap().push(WriteCall::Create {
            domain: domain.to_string(),
            request: request.clone(),
        });

        if self.failing_writes.lock().unwrap().contains(domain) {
            return Err(Error::provider("mock", format!("create failed for {}", domain)));
        }

        let record = DnsRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            record_type: request.record_type.clone(),
            name: request.name.clone(),
            data: request.data.clone(),
            ttl: Some(1800),
        };
        self.records
            .lock()
            .unwrap()
            .entry(domain.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn edit_record(
        &self,
        domain: &str,
        id: u64,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        self.writes.lock().unwrap().push(WriteCall::Edit {
            domain: domain.to_string(),
            id,
            request: request.clone(),
        });

        if self.failing_writes.lock().unwrap().contains(domain) {
            return Err(Error::provider("mock", format!("edit failed for {}", domain)));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(domain)
            .and_then(|list| list.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| Error::not_found(format!("record {} in {}", id, domain)))?;

        record.record_type = request.record_type.clone();
        record.name = request.name.clone();
        record.data = request.data.clone();

        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Resolver that replays scripted answers and counts calls
///
/// Once the script runs out, the last answer repeats.
#[derive(Clone)]
pub struct ScriptedResolver {
    answers: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    last: Arc<Mutex<std::result::Result<String, String>>>,
    calls: Arc<AtomicUsize>,
    sources: Arc<Mutex<Vec<String>>>,
}

impl ScriptedResolver {
    /// Always answer `ip`
    pub fn fixed(ip: &str) -> Self {
        Self::script(vec![Ok(ip.to_string())])
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::script(vec![Err("connection refused".to_string())])
    }

    pub fn script(answers: Vec<std::result::Result<String, String>>) -> Self {
        let last = answers
            .last()
            .cloned()
            .unwrap_or_else(|| Err("empty script".to_string()));

        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(AtomicUsize::new(0)),
            sources: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Source URLs passed to resolve()
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self, source: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().push(source.to_string());

        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.lock().unwrap().clone());

        answer.map_err(|reason| Error::resolution(source, reason))
    }
}

/// Helper to create a validated config for testing
pub fn config_with(records: Vec<DomainSpec>, interval: u64) -> Arc<DdnsConfig> {
    let config = DdnsConfig {
        token: "test-token".to_string(),
        source: "https://ip.test/".to_string(),
        interval,
        records,
    };
    config.validate().expect("test config is valid");
    Arc::new(config)
}
