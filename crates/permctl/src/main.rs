//! `permctl`: command line front end for the network permissioning contracts.

#[macro_use]
extern crate tracing;

use args::{Permctl, PermctlSubcommand};
use clap::Parser;
use eyre::Result;

mod args;
mod cmd;
mod config;
mod handler;
mod opts;

fn main() -> Result<()> {
    handler::install();
    subscriber();
    let args = Permctl::parse();
    run(args)
}

fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn run(args: Permctl) -> Result<()> {
    let Permctl { node, cmd } = args;
    match cmd {
        PermctlSubcommand::Bind(bind) => bind.run(&node.load_config()?),
        PermctlSubcommand::Deploy(deploy) => deploy.run(&node).await,
        PermctlSubcommand::Boot => cmd::boot::run(&node).await,
        PermctlSubcommand::List { kind } => cmd::query::list(&node, kind).await,
        PermctlSubcommand::OrgDetails { org_id } => cmd::query::org_details(&node, &org_id).await,
        PermctlSubcommand::Org(action) => cmd::action::execute(&node, action.into()).await,
        PermctlSubcommand::Node(action) => cmd::action::execute(&node, action.into()).await,
        PermctlSubcommand::Role(action) => cmd::action::execute(&node, action.into()).await,
        PermctlSubcommand::Account(action) => cmd::action::execute(&node, action.into()).await,
        PermctlSubcommand::Watch(watch) => watch.run(&node).await,
        PermctlSubcommand::CheckTx(check) => check.run(&node).await,
    }
}
