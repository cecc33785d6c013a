//! One-shot migration of an ELBv2 listener: copies its rules - and the
//! target groups they reference - onto another listener, optionally creating
//! the destination load balancer and listener first. Meant for cutovers
//! between load balancers without re-entering dozens of routing rules by
//! hand.

mod arn;
mod aws;
mod cloner;
mod elb;
mod types;

use std::process::exit;

use aws_sdk_elasticloadbalancingv2::Client as ELBv2Client;
use clap::Parser;

use crate::cloner::CopyJob;
use crate::elb::SdkElb;

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Copies an ELBv2 listener's rules, and the target groups they reference, to another listener or load balancer. AWS configuration must grant access to both."
)]
struct Options {
    /// ARN of the listener to copy from.
    #[arg(long, env = "SRC_LISTENER_ARN")]
    src_listener_arn: String,
    /// ARN of an existing destination listener (copy rules only).
    #[arg(long, env = "DEST_LISTENER_ARN")]
    dest_listener_arn: Option<String>,
    /// ARN of an existing destination load balancer (copy the listener first,
    /// then its rules). Wins over --dest-listener-arn.
    #[arg(long, env = "DEST_LB_ARN")]
    dest_lb_arn: Option<String>,
    /// ARN of a load balancer to clone as the destination first.
    #[arg(long, env = "SRC_LB_ARN", requires = "dest_lb_name")]
    src_lb_arn: Option<String>,
    /// Name for the cloned destination load balancer.
    #[arg(long, env = "DEST_LB_NAME", requires = "src_lb_arn")]
    dest_lb_name: Option<String>,
    /// Prefix for every created target-group name.
    #[arg(long, env = "DEST_TG_PREFIX", default_value = "copied-tg")]
    dest_tg_prefix: String,
    /// Page size used when listing the source listener's rules.
    #[arg(long, default_value_t = 10)]
    page_size: i32,
    /// AWS region, passed to the SDK untouched.
    #[arg(long)]
    region: Option<String>,
    /// AWS credential profile, passed to the SDK untouched.
    #[arg(long)]
    profile: Option<String>,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}

#[tokio::main]
async fn main() {
    let options = Options::parse();
    env_logger::Builder::new()
        .filter_level(options.verbose.log_level_filter())
        .init();

    let config = aws::sdk_config(options.region.clone(), options.profile.clone()).await;
    let api = SdkElb::new(ELBv2Client::new(&config));

    let job = CopyJob {
        src_listener_arn: options.src_listener_arn,
        dest_listener_arn: options.dest_listener_arn,
        dest_lb_arn: options.dest_lb_arn,
        src_lb_arn: options.src_lb_arn,
        dest_lb_name: options.dest_lb_name,
        dest_tg_prefix: options.dest_tg_prefix,
        page_size: options.page_size,
    };

    if let Err(err) = cloner::run(&api, &job).await {
        eprintln!("{}", err);
        exit(1);
    }
}
