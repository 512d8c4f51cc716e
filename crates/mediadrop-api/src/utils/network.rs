//! Local network address discovery for the startup banner.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// IPv4 address other devices on the LAN can reach this host at.
///
/// Interface addresses are scanned first, preferring private ranges. When no
/// interface qualifies, the OS is asked which address routes outward.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    pick_lan_address(interface_ipv4s()).or_else(routed_ipv4)
}

fn pick_lan_address(candidates: Vec<Ipv4Addr>) -> Option<Ipv4Addr> {
    let usable: Vec<Ipv4Addr> = candidates
        .into_iter()
        .filter(|ip| is_lan_candidate(*ip))
        .collect();

    usable
        .iter()
        .copied()
        .find(|ip| ip.is_private())
        .or_else(|| usable.first().copied())
}

fn is_lan_candidate(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !ip.is_link_local()
}

/// IPv4 addresses of every interface that is up.
#[cfg(unix)]
fn interface_ipv4s() -> Vec<Ipv4Addr> {
    let mut addrs = Vec::new();
    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();

    // SAFETY: on success `head` points at a list owned by libc until the
    // matching `freeifaddrs` below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return addrs;
    }

    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: `cursor` is a non-null node of the list returned above.
        let ifa = unsafe { &*cursor };
        let is_up = ifa.ifa_flags & (libc::IFF_UP as libc::c_uint) != 0;

        // SAFETY: a non-null `ifa_addr` points at a sockaddr whose family
        // tells us the concrete layout; AF_INET means sockaddr_in.
        if is_up && !ifa.ifa_addr.is_null() {
            let family = i32::from(unsafe { (*ifa.ifa_addr).sa_family });
            if family == libc::AF_INET {
                let sin = unsafe { &*(ifa.ifa_addr as *const libc::sockaddr_in) };
                addrs.push(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)));
            }
        }

        cursor = ifa.ifa_next;
    }

    // SAFETY: `head` came from a successful `getifaddrs` and is freed once.
    unsafe { libc::freeifaddrs(head) };

    addrs
}

#[cfg(not(unix))]
fn interface_ipv4s() -> Vec<Ipv4Addr> {
    Vec::new()
}

/// Source address the OS would pick for outbound traffic. Connecting a UDP
/// socket sends no packets.
fn routed_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if is_lan_candidate(ip) => Some(ip),
        _ => None,
    }
}
