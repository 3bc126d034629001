mod engine_roundtrip;
