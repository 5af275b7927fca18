use ipnet::Ipv4Net;
use log::debug;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::{DdnsError, Result};

/// 按枚举顺序挑第一个合格的IPv4地址：跳过回环，有子网限制时要求落在子网内
fn select_ip(
    candidates: impl IntoIterator<Item = IpAddr>,
    subnet: Option<&Ipv4Net>,
) -> Option<Ipv4Addr> {
    candidates.into_iter().find_map(|addr| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() => match subnet {
            Some(net) if !net.contains(&v4) => None,
            _ => Some(v4),
        },
        _ => None,
    })
}

/// 获取本机局域网IP
///
/// CIDR格式错误直接报错，不会误报成"找不到地址"
pub fn local_ip(subnet: Option<&str>) -> Result<Ipv4Addr> {
    let filter = match subnet {
        Some(cidr) => Some(
            cidr.parse::<Ipv4Net>()
                .map_err(|_| DdnsError::InvalidSubnet(cidr.to_string()))?,
        ),
        None => None,
    };

    let addrs = if_addrs::get_if_addrs()?;
    debug!("found {} interface addresses", addrs.len());

    select_ip(addrs.into_iter().map(|ifaddr| ifaddr.ip()), filter.as_ref())
        .ok_or(DdnsError::NoAddressFound)
}
