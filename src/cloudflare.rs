use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{DdnsError, Result};
use crate::{DnsProvider, DnsRecord};

const API_BASE: &str = "https://api.cloudflare.com/client/v4";

// 记录TTL固定120秒：传播够快，又不会频繁触碰API限额
const DNS_TTL: u32 = 120;

// ========== Cloudflare 相关结构 ==========

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareListResponse {
    success: bool,
    errors: Vec<CloudflareError>,
    result: Vec<CloudflareRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareRecordResponse {
    success: bool,
    errors: Vec<CloudflareError>,
    result: CloudflareRecord,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct CloudflareRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
    ttl: u32,
    proxied: bool,
}

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareError {
    code: i32,
    message: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareVerifyResponse {
    success: bool,
    errors: Vec<CloudflareError>,
}

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareZoneListResponse {
    success: bool,
    errors: Vec<CloudflareError>,
    result: Vec<CloudflareZone>,
}

#[derive(Serialize, Deserialize, Debug)]
struct CloudflareZone {
    id: String,
    name: String,
}

#[derive(Serialize, Deserialize)]
struct CloudflareWriteRequest {
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    content: String,
    ttl: u32,
    proxied: bool,
}

/// 把Cloudflare返回的errors数组拼成一个错误，token类错误码单独归为认证失败
fn api_error(errors: &[CloudflareError]) -> DdnsError {
    let joined: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect();
    let joined = joined.join(", ");
    // 6003/9109/10000 都是token被拒
    if errors.iter().any(|e| matches!(e.code, 6003 | 9109 | 10000)) {
        DdnsError::Auth(joined)
    } else {
        DdnsError::Provider(joined)
    }
}

// ========== Cloudflare Provider 实现 ==========

#[derive(Debug)]
pub struct CloudflareProvider {
    api_base: String,
    api_token: String,
    zone_id: String,
    record_name: String,
    client: reqwest::blocking::Client,
}

impl CloudflareProvider {
    /// 校验token并解析Zone ID，Zone每次运行只查一次
    pub fn connect(api_token: String, zone_name: &str, record_name: &str) -> Result<Self> {
        Self::connect_at(API_BASE.to_string(), api_token, zone_name, record_name)
    }

    fn connect_at(
        api_base: String,
        api_token: String,
        zone_name: &str,
        record_name: &str,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::new();

        Self::verify_token(&client, &api_base, &api_token)?;
        let zone_id = Self::lookup_zone(&client, &api_base, &api_token, zone_name)?;

        // 完整记录名 = 子域名 + "." + 域名
        let record_name = format!("{record_name}.{zone_name}");

        Ok(CloudflareProvider {
            api_base,
            api_token,
            zone_id,
            record_name,
            client,
        })
    }

    fn verify_token(
        client: &reqwest::blocking::Client,
        api_base: &str,
        api_token: &str,
    ) -> Result<()> {
        let url = format!("{api_base}/user/tokens/verify");
        let response: CloudflareVerifyResponse = client
            .get(&url)
            .header("Authorization", format!("Bearer {api_token}"))
            .header("Content-Type", "application/json")
            .send()?
            .json()?;

        if !response.success {
            let msgs: Vec<String> = response
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            return Err(DdnsError::Auth(msgs.join(", ")));
        }
        debug!("api token verified");
        Ok(())
    }

    fn lookup_zone(
        client: &reqwest::blocking::Client,
        api_base: &str,
        api_token: &str,
        zone_name: &str,
    ) -> Result<String> {
        debug!("querying zone_id for domain: {}", zone_name);
        let url = format!("{api_base}/zones?name={zone_name}");
        let zone_list: CloudflareZoneListResponse = client
            .get(&url)
            .header("Authorization", format!("Bearer {api_token}"))
            .header("Content-Type", "application/json")
            .send()?
            .json()?;

        if !zone_list.success {
            return Err(api_error(&zone_list.errors));
        }

        if zone_list.result.is_empty() {
            return Err(DdnsError::ZoneNotFound(zone_name.to_string()));
        }

        let zone_id = zone_list.result[0].id.clone();
        debug!("found zone_id for {}: {}", zone_name, zone_id);
        Ok(zone_id)
    }

    fn write_request(&self, current_ip: &str, record_type: &str) -> CloudflareWriteRequest {
        CloudflareWriteRequest {
            record_type: record_type.to_string(),
            name: self.record_name.clone(),
            content: current_ip.to_string(),
            ttl: DNS_TTL,
            proxied: false,
        }
    }
}

impl DnsProvider for CloudflareProvider {
    /// 按完整记录名精确查询A记录，多条时只看第一条
    fn get_record(&self) -> Result<Option<DnsRecord>> {
        let url = format!(
            "{}/zones/{}/dns_records?type=A&name={}",
            self.api_base, self.zone_id, self.record_name
        );

        let res = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .send()?;

        let text = res.text()?;
        let result: serde_json::Result<CloudflareListResponse> = serde_json::from_str(&text);

        match result {
            Ok(response) => {
                if !response.success {
                    return Err(api_error(&response.errors));
                }

                if !response.result.is_empty() {
                    let record = &response.result[0];
                    info!("current cloudflare record is {:?}", record);
                    Ok(Some(DnsRecord {
                        id: record.id.clone(),
                        name: record.name.clone(),
                        value: record.content.clone(),
                        record_type: record.record_type.clone(),
                    }))
                } else {
                    Ok(None)
                }
            }
            Err(err) => {
                warn!("error parse cloudflare result: {text}");
                Err(DdnsError::Provider(err.to_string()))
            }
        }
    }

    /// 修改已有记录，保留记录ID和类型
    fn modify_record(&self, current_ip: &str, record: &DnsRecord) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.api_base, self.zone_id, record.id
        );

        let res = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&self.write_request(current_ip, &record.record_type))
            .send()?;

        let text = res.text()?;
        let result: serde_json::Result<CloudflareRecordResponse> = serde_json::from_str(&text);

        match result {
            Ok(response) => {
                if response.success {
                    debug!("cloudflare modify result: success");
                    Ok(())
                } else {
                    Err(api_error(&response.errors))
                }
            }
            Err(err) => {
                warn!("error parse cloudflare modify result: {text}");
                Err(DdnsError::Provider(err.to_string()))
            }
        }
    }

    /// 新建A记录
    fn add_record(&self, current_ip: &str) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records", self.api_base, self.zone_id);

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&self.write_request(current_ip, "A"))
            .send()?;

        let text = res.text()?;
        let result: serde_json::Result<CloudflareRecordResponse> = serde_json::from_str(&text);

        match result {
            Ok(response) => {
                if response.success {
                    debug!("cloudflare add result: success");
                    Ok(())
                } else {
                    Err(api_error(&response.errors))
                }
            }
            Err(err) => {
                warn!("error parse cloudflare add result: {text}");
                Err(DdnsError::Provider(err.to_string()))
            }
        }
    }
}
