//! The copy pipeline: optionally clone a load balancer, clone the source
//! listener onto the destination, then replicate the listener's rules.
//! Everything runs strictly sequentially; the first failure aborts the run
//! and already-created resources are left in place.

pub mod listener;
pub mod load_balancer;
pub mod rules;
pub mod target_group;

use log::{info, warn};

use crate::elb::ElbApi;
use crate::types::CopyError;
use self::target_group::TargetGroupCache;

/// Everything a single copy run needs to know.
#[derive(Debug, Clone)]
pub struct CopyJob {
    pub src_listener_arn: String,
    pub dest_listener_arn: Option<String>,
    pub dest_lb_arn: Option<String>,
    pub src_lb_arn: Option<String>,
    pub dest_lb_name: Option<String>,
    pub dest_tg_prefix: String,
    pub page_size: i32,
}

/// Executes one copy run. Mode selection: a destination load balancer
/// (existing or cloned from `src_lb_arn`) means the listener is copied first
/// and wins over `dest_listener_arn`; a destination listener alone means
/// rules only; neither means there is nothing to do.
pub async fn run(api: &dyn ElbApi, job: &CopyJob) -> Result<(), CopyError> {
    let mut cache = TargetGroupCache::new();

    let dest_lb_arn = match (&job.dest_lb_arn, &job.src_lb_arn, &job.dest_lb_name) {
        (Some(arn), _, _) => Some(arn.clone()),
        (None, Some(src_lb_arn), Some(dest_lb_name)) => {
            let lb = load_balancer::clone_load_balancer(api, src_lb_arn, dest_lb_name).await?;
            info!("Created load balancer: {:?}", lb.load_balancer_name);
            lb.load_balancer_arn
        }
        _ => None,
    };

    if let Some(dest_lb_arn) = dest_lb_arn {
        let new_listener = listener::clone_listener(
            api,
            &mut cache,
            &job.src_listener_arn,
            &dest_lb_arn,
            &job.dest_tg_prefix,
        )
        .await?;
        let dest_listener_arn =
            new_listener
                .listener_arn
                .clone()
                .ok_or_else(|| CopyError::Malformed {
                    msg: format!("created listener on {} has no ARN", dest_lb_arn),
                })?;
        info!("Created listener: {}", dest_listener_arn);
        let copied = rules::replicate_rules(
            api,
            &mut cache,
            &job.src_listener_arn,
            &dest_listener_arn,
            &job.dest_tg_prefix,
            job.page_size,
        )
        .await?;
        info!("Copied {} rules", copied.len());
    } else if let Some(dest_listener_arn) = &job.dest_listener_arn {
        let copied = rules::replicate_rules(
            api,
            &mut cache,
            &job.src_listener_arn,
            dest_listener_arn,
            &job.dest_tg_prefix,
            job.page_size,
        )
        .await?;
        info!("Copied {} rules", copied.len());
    } else {
        warn!("No destination listener or load balancer configured - nothing to do.");
    }
    Ok(())
}
