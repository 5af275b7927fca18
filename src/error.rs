use thiserror::Error;

pub type Result<T> = std::result::Result<T, DdnsError>;

/// 整个同步流程的错误分类
#[derive(Error, Debug)]
pub enum DdnsError {
    /// 缺少必需的配置项（token或域名）
    #[error("configuration error: {0}")]
    Config(String),

    /// 子网CIDR格式非法，与"找不到地址"是两种不同的失败
    #[error("invalid subnet CIDR: {0}")]
    InvalidSubnet(String),

    /// 本机没有符合条件的IPv4地址
    #[error("no local IP address found")]
    NoAddressFound,

    /// 枚举网卡地址失败
    #[error("failed to list interface addresses: {0}")]
    Io(#[from] std::io::Error),

    /// API token被Cloudflare拒绝
    #[error("authentication failed: {0}")]
    Auth(String),

    /// 域名没有对应的Zone
    #[error("no zone found for domain: {0}")]
    ZoneNotFound(String),

    /// 查询/创建/修改记录的API调用失败
    #[error("provider error: {0}")]
    Provider(String),
}

// HTTP层的错误统一归为Provider错误
impl From<reqwest::Error> for DdnsError {
    fn from(err: reqwest::Error) -> Self {
        DdnsError::Provider(err.to_string())
    }
}
