//! Operator CLI for the search service.
//!
//! Runs one operation against the configured index as a given requester and
//! prints the result as JSON on stdout.
//!
//! Usage:
//!   sm-search --user-id u1 --group G1 --role p1=MEMBER search annotation --args '{"filter":{"fdrLevel":0.1}}'
//!   sm-search --admin --user-id root count-grouped dataset --fields DF_POLARITY,DF_ORGANISM

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sm_query::{DocType, GroupingField, ProjectRole, QueryArgs, RequesterIdentity, RoleMap};
use sm_search::roles::parse_role_assignment;
use sm_search::{build_service, logging, Config, FixedRoles, RequestContext};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sm-search", version)]
#[command(about = "Query the dataset/annotation index as a given requester")]
struct Cli {
    /// Requester user id. Omit for an anonymous request.
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Group the requester belongs to (repeatable).
    #[arg(long = "group", global = true)]
    groups: Vec<String>,

    /// Treat the requester as an administrator. Requires --user-id.
    #[arg(long, global = true)]
    admin: bool,

    /// Project role as PROJECT=ROLE (repeatable).
    #[arg(long = "role", global = true, value_parser = parse_role_assignment)]
    roles: Vec<(String, ProjectRole)>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page of matching documents
    Search {
        doc_type: DocKind,
        /// Query arguments as JSON (orderBy, filter, datasetFilter, limit, ...)
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Count matching documents
    Count {
        doc_type: DocKind,
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Count matching documents per combination of field values
    CountGrouped {
        doc_type: DocKind,
        #[arg(long, default_value = "{}")]
        args: String,
        /// Grouping keys, e.g. DF_POLARITY,DF_ORGANISM
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Count matching annotations per dataset
    CountPerDataset {
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Count matching documents per value of one field
    ValueCounts {
        doc_type: DocKind,
        /// Grouping key, e.g. DF_ORGANISM
        field: String,
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Look up an annotation by id
    Annotation { id: String },
    /// Look up a dataset by id
    Dataset {
        id: String,
        /// Ignore visibility (internal lookups only)
        #[arg(long)]
        privileged: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DocKind {
    Dataset,
    Annotation,
}

impl From<DocKind> for DocType {
    fn from(kind: DocKind) -> Self {
        match kind {
            DocKind::Dataset => DocType::Dataset,
            DocKind::Annotation => DocType::Annotation,
        }
    }
}

fn parse_args(raw: &str) -> anyhow::Result<QueryArgs> {
    serde_json::from_str(raw).context("Invalid --args JSON")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        index = %config.elasticsearch.index,
        "Starting sm-search"
    );

    let identity = RequesterIdentity {
        id: cli.user_id.clone(),
        is_admin: cli.admin,
        group_ids: (!cli.groups.is_empty()).then(|| cli.groups.clone()),
    };
    if cli.admin && identity.is_anonymous() {
        anyhow::bail!("--admin requires a non-blank --user-id");
    }
    let mut resolver = FixedRoles::new();
    if let Some(user_id) = &cli.user_id {
        let roles: RoleMap = cli.roles.iter().cloned().collect();
        resolver = resolver.with_user(user_id.clone(), roles);
    }
    let ctx = RequestContext::new(identity, Arc::new(resolver));

    let service = build_service(&config).context("Failed to build search service")?;

    match cli.command {
        Command::Search { doc_type, args } => {
            let hits = service
                .search(&parse_args(&args)?, doc_type.into(), &ctx)
                .await?;
            print_json(&hits)
        }
        Command::Count { doc_type, args } => {
            let count = service
                .count(&parse_args(&args)?, doc_type.into(), &ctx)
                .await?;
            print_json(&count)
        }
        Command::CountGrouped {
            doc_type,
            args,
            fields,
        } => {
            let fields = GroupingField::parse_list(&fields)?;
            let counts = service
                .count_grouped(&parse_args(&args)?, doc_type.into(), &fields, &ctx)
                .await?;
            print_json(&counts)
        }
        Command::CountPerDataset { args } => {
            let counts = service
                .count_per_dataset(&parse_args(&args)?, &ctx)
                .await?;
            print_json(&counts)
        }
        Command::ValueCounts {
            doc_type,
            field,
            args,
        } => {
            let field: GroupingField = field.parse()?;
            let filters = service.composer().filter_clauses(&parse_args(&args)?);
            let counts = service
                .filter_value_counts(field, filters, doc_type.into(), &ctx)
                .await?;
            print_json(&counts)
        }
        Command::Annotation { id } => print_json(&service.annotation_by_id(&id, &ctx).await?),
        Command::Dataset { id, privileged } => {
            let hit = if privileged {
                service.dataset_by_id_privileged(&id).await?
            } else {
                service.dataset_by_id(&id, &ctx).await?
            };
            print_json(&hit)
        }
    }
}
