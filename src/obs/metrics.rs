// self
use crate::obs::GrantOutcome;

/// Records a grant outcome via the global metrics recorder (when enabled).
pub fn record_grant_outcome(grant: &str, outcome: GrantOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_issuer_grant_total",
			"grant" => grant.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_grant_outcome_noop_without_recorder() {
		record_grant_outcome("implicit", GrantOutcome::Failure);
	}
}
