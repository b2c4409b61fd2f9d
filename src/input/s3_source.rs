// 该文件是 Jingchen （净尘） 项目的一部分。
// src/input/s3_source.rs - S3 图像来源
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, error::DisplayErrorContext};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::{ImageSource, InputError, object_key},
};

/// 从 `s3://bucket` 下载对象。凭证和区域取自标准 AWS 环境配置。
///
/// SDK 是异步的，这里持有一个单线程运行时，逐个阻塞等待下载完成。
pub struct S3ImageSource {
  bucket: String,
  runtime: Runtime,
  client: Client,
}

impl FromUrlWithScheme for S3ImageSource {
  const SCHEME: &'static str = "s3";
}

impl FromUrl for S3ImageSource {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(InputError::SchemeMismatch(format!(
        "期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    let bucket = url
      .host_str()
      .filter(|bucket| !bucket.is_empty())
      .ok_or_else(|| InputError::InvalidUrl(format!("缺少存储桶名称: {}", url)))?
      .to_string();

    let runtime = Builder::new_current_thread().enable_all().build()?;
    let config = runtime.block_on(aws_config::defaults(BehaviorVersion::latest()).load());
    let client = Client::new(&config);
    info!("使用 S3 存储桶: {}", bucket);

    Ok(S3ImageSource {
      bucket,
      runtime,
      client,
    })
  }
}

impl ImageSource for S3ImageSource {
  fn fetch(&self, image_url: &str) -> Result<Vec<u8>, InputError> {
    let key = object_key(image_url);
    debug!("下载 s3://{}/{}", self.bucket, key);

    self.runtime.block_on(async {
      let object = self
        .client
        .get_object()
        .bucket(&self.bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| InputError::S3Error(format!("{}: {}", key, DisplayErrorContext(&e))))?;

      let data = object
        .body
        .collect()
        .await
        .map_err(|e| InputError::S3Error(format!("{}: {}", key, e)))?;

      Ok::<_, InputError>(data.into_bytes().to_vec())
    })
  }
}
