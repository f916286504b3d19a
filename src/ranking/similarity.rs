//! 문자열 유사도 - 최장 일치 블록 기반 비율
//!
//! ref: Ratcliff/Obershelp "gestalt pattern matching"
//!
//! ratio = 2 * M / (|a| + |b|), M = 재귀적으로 찾은 최장 공통 블록 길이의 합.
//! 문자(char) 단위로 비교하므로 한글도 음절 단위로 계산됩니다.
//! 비교 대상이 200자 이상이면 출현 빈도가 1% + 1회를 넘는 문자는
//! 블록 시작점에서 제외합니다 (자동 정크 휴리스틱).

use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// 두 문자열의 유사도 (0.0 ~ 1.0)
///
/// 둘 다 비어있으면 1.0을 반환합니다.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = BlockMatcher::new(&a, &b).matched_chars();
    2.0 * matched as f64 / total as f64
}

// ============================================================================
// BlockMatcher
// ============================================================================

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// b의 문자 → 등장 위치 (오름차순)
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// 모든 일치 블록 길이의 합
    fn matched_chars(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;

            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    /// a[alo..ahi], b[blo..bhi] 구간의 최장 일치 블록 (i, j, 길이)
    ///
    /// 길이가 같으면 a에서 가장 앞, 그다음 b에서 가장 앞 블록을 고릅니다.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            j2len = next;
        }

        // 정크로 제외된 문자도 양옆으로는 이어 붙임
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi
            && best_j + best_k < bhi
            && self.a[best_i + best_k] == self.b[best_j + best_k]
        {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_and_disjoint() {
        assert!(approx(similarity_ratio("출결 문의", "출결 문의"), 1.0));
        assert!(approx(similarity_ratio("abc", "xyz"), 0.0));
        assert!(approx(similarity_ratio("", ""), 1.0));
        assert!(approx(similarity_ratio("", "abc"), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // 일치 블록: "ab", "d" → M = 3
        assert!(approx(similarity_ratio("abcd", "bcde"), 0.75));
        assert!(approx(similarity_ratio("abxcd", "abcd"), 8.0 / 9.0));
    }

    #[test]
    fn test_korean_syllables() {
        // "훈련장려금"(5) + " 얼마"(3) + "요?"(2) = 10, 전체 11 + 13
        let ratio = similarity_ratio("훈련장려금 얼마예요?", "훈련장려금은 얼마인가요?");
        assert!(approx(ratio, 20.0 / 24.0));
    }

    #[test]
    fn test_symmetric_for_short_inputs() {
        let a = "줌 배경 설정";
        let b = "배경 화면도 설정해야 하나요?";
        let ab = similarity_ratio(a, b);
        let ba = similarity_ratio(b, a);
        assert!((0.0..=1.0).contains(&ab));
        assert!(ab > 0.0 && ba > 0.0);
    }

    #[test]
    fn test_autojunk_long_text() {
        let long: String = "가".repeat(150) + &"나".repeat(100);
        // 모든 문자가 빈도 제한을 넘어 시작점이 없고, 확장으로 1자만 일치
        assert!(approx(similarity_ratio("가나", &long), 2.0 / 252.0));
        // 짧은 쪽이 b이면 정크 없음
        assert!(approx(similarity_ratio(&long, "가나"), 4.0 / 252.0));
    }
}
