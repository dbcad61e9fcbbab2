use std::net::IpAddr;
use std::time::{Duration, Instant};
use zkpay::guards::{ClientQuota, RateLimiter};

#[test]
fn test_client_quota_struct() {
    let quota = ClientQuota(42);
    assert_eq!(quota.0, 42);
}

#[test]
fn test_limiter_counts_down_then_rejects() {
    let limiter = RateLimiter::new(3, Duration::from_secs(900));
    let client: Option<IpAddr> = Some("192.168.1.10".parse().unwrap());

    assert_eq!(limiter.check(client), Some(2));
    assert_eq!(limiter.check(client), Some(1));
    assert_eq!(limiter.check(client), Some(0));
    assert_eq!(limiter.check(client), None);
    assert_eq!(limiter.check(client), None);
}

#[test]
fn test_unknown_clients_share_a_bucket() {
    let limiter = RateLimiter::new(1, Duration::from_secs(900));
    assert_eq!(limiter.check(None), Some(0));
    assert_eq!(limiter.check(None), None);
    assert_eq!(limiter.check(Some("::1".parse().unwrap())), Some(0));
}

#[test]
fn test_window_expiry_restores_quota() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    let client: Option<IpAddr> = Some("10.1.1.1".parse().unwrap());
    let start = Instant::now();

    assert_eq!(limiter.check_at(client, start), Some(0));
    assert_eq!(limiter.check_at(client, start + Duration::from_secs(59)), None);
    assert_eq!(limiter.check_at(client, start + Duration::from_secs(60)), Some(0));
    assert_eq!(limiter.max_requests(), 1);
}

#[test]
fn test_expired_clients_are_forgotten() {
    let limiter = RateLimiter::new(5, Duration::from_secs(900));
    let start = Instant::now();

    for i in 0..1_000u32 {
        let client: Option<IpAddr> = Some(IpAddr::from(i.to_be_bytes()));
        limiter.check_at(client, start);
    }
    assert_eq!(limiter.tracked_clients(), 1_000);

    let late: Option<IpAddr> = Some("10.9.9.9".parse().unwrap());
    assert_eq!(
        limiter.check_at(late, start + Duration::from_secs(3600)),
        Some(4)
    );
    assert_eq!(limiter.tracked_clients(), 1);
}
