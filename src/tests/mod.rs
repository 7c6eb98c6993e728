#[cfg(test)]
mod util;

#[cfg(test)]
mod anomaly_test;
#[cfg(test)]
mod cluster_test;
#[cfg(test)]
mod output_test;
#[cfg(test)]
mod record_test;
#[cfg(test)]
mod stats_test;
