use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Random delay within `[min_ms, max_ms]`, used to space out requests
pub fn jittered_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

/// Pick a user agent from the pool, or `None` if the pool is empty
pub fn pick_user_agent(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::thread_rng()).map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_delay_in_range() {
        for _ in 0..100 {
            let delay = jittered_delay(100, 250);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(250));
        }
        assert_eq!(jittered_delay(0, 0), Duration::ZERO);
        assert_eq!(jittered_delay(40, 10), Duration::from_millis(40));
    }

    #[test]
    fn test_pick_user_agent() {
        assert_eq!(pick_user_agent(&[]), None);

        let pool = vec!["a".to_string(), "b".to_string()];
        let picked = pick_user_agent(&pool).unwrap();
        assert!(picked == "a" || picked == "b");
    }
}
