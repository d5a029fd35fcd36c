// Squared Euclidean distance kernels for the flat index.
// Same dispatch hierarchy as the rest of the hot path: AVX2/FMA on x86_64,
// NEON on aarch64, two-accumulator scalar code everywhere else.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

#[cfg(target_arch = "x86_64")]
const MIN_DIM_SIZE_AVX: usize = 32;

#[cfg(target_arch = "aarch64")]
const MIN_DIM_SIZE_NEON: usize = 16;

/// Squared L2 distance between two slices.
///
/// Returns `f32::INFINITY` when the lengths differ so that a mismatched row
/// always sorts last instead of panicking.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
            && a.len() >= MIN_DIM_SIZE_AVX
        {
            return unsafe { squared_l2_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && a.len() >= MIN_DIM_SIZE_NEON {
            return unsafe { squared_l2_neon(a, b) };
        }
    }

    squared_l2_scalar(a, b)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn squared_l2_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc = _mm256_setzero_ps();

    while i + 8 <= dim {
        let va = _mm256_loadu_ps(a.as_ptr().add(i));
        let vb = _mm256_loadu_ps(b.as_ptr().add(i));
        let diff = _mm256_sub_ps(va, vb);
        acc = _mm256_fmadd_ps(diff, diff, acc);
        i += 8;
    }

    let high = _mm256_extractf128_ps(acc, 1);
    let low = _mm256_castps256_ps128(acc);
    let mut sum = _mm_add_ps(high, low);
    sum = _mm_hadd_ps(sum, sum);
    sum = _mm_hadd_ps(sum, sum);
    let mut total = _mm_cvtss_f32(sum);

    while i < dim {
        let diff = a[i] - b[i];
        total += diff * diff;
        i += 1;
    }

    total
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn squared_l2_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc = vdupq_n_f32(0.0);

    while i + 4 <= dim {
        let va = vld1q_f32(a.as_ptr().add(i));
        let vb = vld1q_f32(b.as_ptr().add(i));
        let diff = vsubq_f32(va, vb);
        acc = vfmaq_f32(acc, diff, diff);
        i += 4;
    }

    let mut total = vaddvq_f32(acc);
    while i < dim {
        let diff = a[i] - b[i];
        total += diff * diff;
        i += 1;
    }

    total
}

#[inline]
fn squared_l2_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut even = 0.0f32;
    let mut odd = 0.0f32;

    let pairs_a = a.chunks_exact(2);
    let tail = pairs_a.remainder();
    for (pa, pb) in pairs_a.zip(b.chunks_exact(2)) {
        let d0 = pa[0] - pb[0];
        let d1 = pa[1] - pb[1];
        even += d0 * d0;
        odd += d1 * d1;
    }
    if let (Some(x), Some(y)) = (tail.first(), b.last()) {
        let d = x - y;
        even += d * d;
    }

    even + odd
}
