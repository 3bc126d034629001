mod salt_entropy;
mod timing_sidechannel;
