//! Blocking HTTP delivery of fixes to the collector.
//!
//! One POST per fix with a JSON body (see [UploadPayload]). Status 200 and 201 count as
//! accepted, anything else, including a timeout, is a failure the scheduler retries.

use std::{
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::{
    constants::{DEFAULT_PROBE_TIMEOUT, DEFAULT_SEND_TIMEOUT, HTTP_CREATED, HTTP_OK},
    error::UplinkError,
    fix::Fix,
    payload::UploadPayload,
    transport::Transport,
};

/// Minimal HTTP client surface, so the transport can be tested without a network.
pub trait HttpClient {
    /// Performs a POST and returns the response status code.
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<u16, UplinkError>;
}

/// [HttpClient] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Builds a client whose every request, connect included, gives up after `timeout`.
    ///
    /// Idle connections are not pooled: each send opens and releases its own connection.
    /// Requests go through `proxy` when given. Proxy environment variables are ignored.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, UplinkError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(0)
            .no_proxy();
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|_| UplinkError::InvalidEndpoint(proxy.to_string()))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| UplinkError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: String,
    ) -> Result<u16, UplinkError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                UplinkError::Timeout
            } else {
                UplinkError::Request(e.to_string())
            }
        })?;
        Ok(response.status().as_u16())
    }
}

/// Where and how fixes are uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub endpoint: String,
    /// Sent verbatim in the `Authorization` header
    pub token: String,
    pub send_timeout: Duration,
    /// Upper bound on one whole availability check, name resolution included
    pub probe_timeout: Duration,
    /// HTTP proxy URL; when set, reachability is checked against the proxy
    pub proxy: Option<String>,
}

impl UploadConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            proxy: None,
        }
    }
}

/// Reachability check of the first hop: the proxy when one is configured, the collector
/// otherwise.
///
/// Every call, resolution and connect attempts together, returns within `timeout`.
#[derive(Debug, Clone)]
struct LinkProbe {
    host: String,
    port: u16,
    addrs: Vec<SocketAddr>,
    timeout: Duration,
}

impl LinkProbe {
    fn for_config(config: &UploadConfig) -> Result<Self, UplinkError> {
        // Checked even when proxied, requests still need it
        let (host, port) = host_and_port(&config.endpoint)?;
        let (host, port) = match &config.proxy {
            Some(proxy) => host_and_port(proxy)?,
            None => (host, port),
        };
        Ok(Self {
            host,
            port,
            addrs: Vec::new(),
            timeout: config.probe_timeout,
        })
    }

    /// Resolves the host on a helper thread, giving up after `budget`. A lookup that
    /// outlives it finishes in the background and is discarded.
    fn resolve(&mut self, budget: Duration) {
        let (tx, rx) = mpsc::channel();
        let target = (self.host.clone(), self.port);
        thread::spawn(move || {
            let addrs = target.to_socket_addrs().map(|addrs| addrs.collect::<Vec<_>>());
            let _ = tx.send(addrs);
        });
        self.addrs = match rx.recv_timeout(budget) {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => {
                debug!("Cannot resolve {}:{}: {}", self.host, self.port, e);
                Vec::new()
            },
            Err(_) => {
                debug!("Resolving {}:{} timed out", self.host, self.port);
                Vec::new()
            },
        };
    }

    fn refresh(&mut self) {
        self.resolve(self.timeout);
    }

    fn is_reachable(&mut self) -> bool {
        let deadline = Instant::now() + self.timeout;
        if self.addrs.is_empty() {
            self.resolve(self.timeout);
        }
        for addr in &self.addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!("Reachability check of {}:{} ran out of time", self.host, self.port);
                return false;
            }
            if TcpStream::connect_timeout(addr, remaining).is_ok() {
                return true;
            }
        }
        false
    }
}

fn host_and_port(url: &str) -> Result<(String, u16), UplinkError> {
    let invalid = || UplinkError::InvalidEndpoint(url.to_string());
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;
    let host = parsed.host_str().ok_or_else(invalid)?;
    let port = parsed.port_or_known_default().ok_or_else(invalid)?;
    Ok((
        host.trim_start_matches('[').trim_end_matches(']').to_string(),
        port,
    ))
}

/// [Transport] that POSTs fixes to an HTTP collector.
pub struct HttpTransport<C: HttpClient = ReqwestClient> {
    client: C,
    config: UploadConfig,
    probe: LinkProbe,
}

impl HttpTransport<ReqwestClient> {
    pub fn new(config: UploadConfig) -> Result<Self, UplinkError> {
        let client = ReqwestClient::new(config.send_timeout, config.proxy.as_deref())?;
        Self::with_client(client, config)
    }
}

impl<C: HttpClient> HttpTransport<C> {
    pub fn with_client(client: C, config: UploadConfig) -> Result<Self, UplinkError> {
        let probe = LinkProbe::for_config(&config)?;
        Ok(Self {
            client,
            config,
            probe,
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Uploads one fix, mapping any status other than 200/201 to an error.
    pub fn upload(&self, fix: &Fix) -> Result<(), UplinkError> {
        let body = UploadPayload::from(fix)
            .to_json()
            .map_err(|e| UplinkError::Request(format!("Failed to encode payload: {}", e)))?;
        debug!("Payload: {}", body);

        let headers = [
            ("Content-Type", "application/json"),
            ("Authorization", self.config.token.as_str()),
        ];
        let status = self
            .client
            .post_json(&self.config.endpoint, &headers, body)?;
        debug!("Server response code: {}", status);
        match status {
            HTTP_OK | HTTP_CREATED => Ok(()),
            status => Err(UplinkError::RejectedStatus { status }),
        }
    }
}

impl<C: HttpClient> Transport for HttpTransport<C> {
    fn is_available(&mut self) -> bool {
        self.probe.is_reachable()
    }

    fn reconnect(&mut self) {
        info!("Reconnecting to {}:{}", self.probe.host, self.probe.port);
        self.probe.refresh();
    }

    fn send(&mut self, fix: &Fix) -> bool {
        match self.upload(fix) {
            Ok(()) => true,
            Err(e) => {
                warn!("Upload of fix at {:?} failed: {}", fix.timestamp, e);
                false
            },
        }
    }
}
