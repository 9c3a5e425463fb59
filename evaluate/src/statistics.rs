/// Standard median over the values that are present and not NaN.
/// Even-sized samples average the two middle values; an empty sample has no
/// median.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut nums: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();
    if nums.is_empty() {
        return None;
    }
    nums.sort_by(f64::total_cmp);
    let mid = nums.len() / 2;
    if nums.len() % 2 == 0 {
        Some((nums[mid - 1] + nums[mid]) / 2.0)
    } else {
        Some(nums[mid])
    }
}

/// Arithmetic mean, same filtering as [`median`].
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
