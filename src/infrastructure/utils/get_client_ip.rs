use std::net::IpAddr;

use actix_web::HttpRequest;

/// Resolves the client address used for rate limiting and analytics.
/// Forwarding headers are only honoured when `trust_forwarded` is set,
/// otherwise any client could pick its own rate-limit bucket.
pub fn get_client_ip(req: &HttpRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .and_then(parse_ip);

        if let Some(ip) = forwarded {
            return ip;
        }

        let real_ip = req
            .headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .and_then(parse_ip);

        if let Some(ip) = real_ip {
            return ip;
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_ip(raw: &str) -> Option<String> {
    raw.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}
