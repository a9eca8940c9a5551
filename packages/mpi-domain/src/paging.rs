/// A resolved `start`/`length` window over a fully merged result sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	pub start: usize,
	pub length: usize,
}
impl Window {
	/// Returns `None` when the caller asked for fewer than one result.
	pub fn resolve(start: Option<i64>, length: Option<i64>, max_results: usize) -> Option<Self> {
		if length.is_some_and(|length| length < 1) {
			return None;
		}

		let start = start.filter(|start| *start > 0).map(|start| start as usize).unwrap_or(0);
		let length = match length {
			Some(length) if (length as u64) <= max_results as u64 => length as usize,
			_ => max_results,
		};

		Some(Self { start, length })
	}

	/// Number of merged results that must be known before the window can be cut.
	pub fn end(&self) -> usize {
		self.start.saturating_add(self.length)
	}

	pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
		items.into_iter().skip(self.start).take(self.length).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::Window;

	#[test]
	fn non_positive_length_is_rejected() {
		assert_eq!(Window::resolve(Some(0), Some(0), 10), None);
		assert_eq!(Window::resolve(None, Some(-3), 10), None);
	}

	#[test]
	fn missing_or_negative_start_becomes_zero() {
		assert_eq!(Window::resolve(None, Some(2), 10), Some(Window { start: 0, length: 2 }));
		assert_eq!(Window::resolve(Some(-4), Some(2), 10), Some(Window { start: 0, length: 2 }));
	}

	#[test]
	fn length_is_capped_by_max_results() {
		assert_eq!(Window::resolve(Some(1), None, 10), Some(Window { start: 1, length: 10 }));
		assert_eq!(Window::resolve(Some(1), Some(50), 10), Some(Window { start: 1, length: 10 }));
	}

	#[test]
	fn window_selects_middle_positions() {
		let window = Window::resolve(Some(2), Some(2), 100).expect("Window should resolve.");

		assert_eq!(window.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);
		assert_eq!(window.end(), 4);
	}
}
