// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clap::Args;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use registrar::{QueryService, RegistrarConfig, RequestContext, SystemClock, WorkflowEngine};
use registrar_domain::PolicyTable;
use registrar_persistence::{FsBlobStore, SqliteCaseStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Where cases, blobs and configuration live.
#[derive(Debug, Clone, Args)]
pub struct StoreOptions {
    /// Path to the `SQLite` database file
    #[arg(long, global = true, default_value = "registrar.db")]
    pub database: PathBuf,

    /// Directory attachment files are written to
    #[arg(long, global = true, default_value = "blobs")]
    pub blobs: PathBuf,

    /// JSON configuration file (organization code, policies, identity rules)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Abandon the operation after this many seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

/// The engine and query service wired to durable adapters.
pub struct App {
    pub engine: WorkflowEngine,
    pub queries: QueryService,
    pub ctx: RequestContext,
}

impl App {
    /// Loads configuration and opens the stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a store cannot
    /// be opened.
    pub fn open(options: &StoreOptions) -> Result<Self> {
        let config: RegistrarConfig = match &options.config {
            Some(path) => RegistrarConfig::load(path)
                .wrap_err_with(|| format!("loading config {}", path.display()))?,
            None => RegistrarConfig::default(),
        };
        let policies: Arc<PolicyTable> = Arc::new(config.policy_table()?);

        let store: Arc<SqliteCaseStore> = Arc::new(
            SqliteCaseStore::new_with_file(&options.database)
                .wrap_err_with(|| format!("opening database {}", options.database.display()))?,
        );
        let blobs: Arc<FsBlobStore> = Arc::new(
            FsBlobStore::new(&options.blobs)
                .wrap_err_with(|| format!("opening blob directory {}", options.blobs.display()))?,
        );
        debug!(
            database = %options.database.display(),
            blobs = %options.blobs.display(),
            organization = %config.organization_code,
            "Opened stores"
        );

        let engine: WorkflowEngine = WorkflowEngine::new(
            store.clone(),
            blobs,
            Arc::new(config.identity_resolver()),
            Arc::new(SystemClock),
            policies.clone(),
        );
        let queries: QueryService = QueryService::new(store, policies);
        let ctx: RequestContext = options
            .timeout_secs
            .map_or_else(RequestContext::new, |secs| {
                RequestContext::with_timeout(Duration::from_secs(secs))
            });

        Ok(Self {
            engine,
            queries,
            ctx,
        })
    }
}
