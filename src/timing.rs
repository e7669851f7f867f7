use std::mem;

use crate::error::Error;
use crate::eval;
use crate::types::Pipeline;

/// One `times(2)` interval, in clock ticks. `user` and `sys` include
/// the reaped children's time.
pub struct Sample {
	pub real: libc::clock_t,
	pub user: libc::clock_t,
	pub sys: libc::clock_t,
}

/// Runs the rest of the pipeline with `times(2)` captured around it and
/// reports real/user/sys seconds. The report is printed whether or not
/// the wrapped pipeline succeeded; the wrapped result is propagated
/// afterwards.
pub fn run(pipeline: &mut Pipeline) -> Result<u8, Error> {
	let first = &mut pipeline.commands[0];
	first.shift_program();
	if first.arguments.is_empty() {
		if pipeline.commands.len() > 1 {
			return Err(Error::WrongInput);
		}
		// bare `time` wraps an empty pipeline
		pipeline.commands.clear();
	}

	let ticks_per_sec = unsafe { libc::sysconf(libc::_SC_CLK_TCK) } as f64;
	let (sample, result) = measure(pipeline);
	println!("{}", format_report(&sample, ticks_per_sec));
	result
}

fn measure(pipeline: &mut Pipeline) -> (Sample, Result<u8, Error>) {
	let mut start: libc::tms = unsafe { mem::zeroed() };
	let mut stop: libc::tms = unsafe { mem::zeroed() };

	let start_real = unsafe { libc::times(&mut start) };
	let result = eval::eval(pipeline);
	let stop_real = unsafe { libc::times(&mut stop) };

	let sample = Sample {
		real: stop_real - start_real,
		user: (stop.tms_utime + stop.tms_cutime) - (start.tms_utime + start.tms_cutime),
		sys: (stop.tms_stime + stop.tms_cstime) - (start.tms_stime + start.tms_cstime),
	};
	(sample, result)
}

fn format_report(sample: &Sample, ticks_per_sec: f64) -> String {
	let seconds = |ticks: libc::clock_t| ticks as f64 / ticks_per_sec;
	format!(
		"real : {:.3}s\nuser : {:.3}s\nsys  : {:.3}s",
		seconds(sample.real),
		seconds(sample.user),
		seconds(sample.sys),
	)
}

#[cfg(test)]
mod tests {
	use super::{format_report, measure, Sample};
	use crate::error::Error;
	use crate::eval;
	use crate::parser;

	#[test]
	fn report_uses_three_decimal_seconds() {
		let report = format_report(&Sample { real: 150, user: 100, sys: 5 }, 100.0);
		assert_eq!(report, "real : 1.500s\nuser : 1.000s\nsys  : 0.050s");
		let report = format_report(&Sample { real: 0, user: 0, sys: 0 }, 100.0);
		assert_eq!(report, "real : 0.000s\nuser : 0.000s\nsys  : 0.000s");
	}

	#[test]
	fn measuring_a_one_second_sleep_reports_at_least_a_second() {
		let ticks_per_sec = unsafe { libc::sysconf(libc::_SC_CLK_TCK) } as f64;
		let mut pipeline = parser::parse("sleep 1").unwrap();
		let (sample, result) = measure(&mut pipeline);
		assert_eq!(result.unwrap(), 0);
		// a hair under 1.0 tolerates coarse tick granularity
		assert!(sample.real as f64 / ticks_per_sec >= 0.99);
		assert!(sample.user >= 0);
		assert!(sample.sys >= 0);
	}

	#[test]
	fn timed_sleep_pipeline_takes_real_time() {
		let start = std::time::Instant::now();
		let mut pipeline = parser::parse("time sleep 1").unwrap();
		assert_eq!(eval::eval(&mut pipeline).unwrap(), 0);
		assert!(start.elapsed() >= std::time::Duration::from_millis(950));
	}

	#[test]
	fn bare_time_wraps_an_empty_pipeline() {
		let mut pipeline = parser::parse("time").unwrap();
		assert_eq!(eval::eval(&mut pipeline).unwrap(), 0);
	}

	#[test]
	fn time_prefix_recurses_through_itself() {
		let mut pipeline = parser::parse("time time").unwrap();
		assert_eq!(eval::eval(&mut pipeline).unwrap(), 0);
	}

	#[test]
	fn bare_time_cannot_head_a_longer_pipeline() {
		let mut pipeline = parser::parse("time | cat").unwrap();
		assert!(matches!(eval::eval(&mut pipeline), Err(Error::WrongInput)));
	}

	#[test]
	fn reports_even_when_the_wrapped_pipeline_fails() {
		let mut pipeline = parser::parse("time cat < /definitely/missing/input").unwrap();
		assert!(matches!(eval::eval(&mut pipeline), Err(Error::File { .. })));
	}
}
