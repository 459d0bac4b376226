//! Shared test fixtures for SOAP response payloads.
//!
//! These constants are used by multiple test modules to avoid duplication.

/// GetPositionInfo response for a streamed track with speaker-relative art.
pub const POSITION_INFO_STREAMING: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/"><s:Body><u:GetPositionInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><Track>3</Track><TrackDuration>0:03:45</TrackDuration><TrackMetaData>&lt;DIDL-Lite xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot; xmlns:upnp=&quot;urn:schemas-upnp-org:metadata-1-0/upnp/&quot; xmlns:r=&quot;urn:schemas-rinconnetworks-com:metadata-1-0/&quot; xmlns=&quot;urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/&quot;&gt;&lt;item id=&quot;-1&quot; parentID=&quot;-1&quot;&gt;&lt;res protocolInfo=&quot;sonos.com-spotify:*:audio/x-spotify:*&quot;&gt;x-sonos-spotify:spotify%3atrack%3a42&lt;/res&gt;&lt;upnp:albumArtURI&gt;/getaa?s=1&amp;amp;u=x-sonos-spotify%3aspotify%253atrack%253a42&lt;/upnp:albumArtURI&gt;&lt;dc:title&gt;Rock &amp;amp; Roll&lt;/dc:title&gt;&lt;upnp:class&gt;object.item.audioItem.musicTrack&lt;/upnp:class&gt;&lt;dc:creator&gt;Led Zeppelin&lt;/dc:creator&gt;&lt;upnp:album&gt;Led Zeppelin IV&lt;/upnp:album&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;</TrackMetaData><TrackURI>x-sonos-spotify:spotify%3atrack%3a42?sid=12</TrackURI><RelTime>0:01:10</RelTime><AbsTime>NOT_IMPLEMENTED</AbsTime><RelCount>2147483647</RelCount><AbsCount>2147483647</AbsCount></u:GetPositionInfoResponse></s:Body></s:Envelope>"#;

/// GetPositionInfo response with an absolute art URL and no album.
pub const POSITION_INFO_ABSOLUTE_ART: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:GetPositionInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><Track>1</Track><TrackMetaData>&lt;DIDL-Lite xmlns:dc=&quot;http://purl.org/dc/elements/1.1/&quot; xmlns:upnp=&quot;urn:schemas-upnp-org:metadata-1-0/upnp/&quot;&gt;&lt;item&gt;&lt;dc:title&gt;Morning Show&lt;/dc:title&gt;&lt;dc:creator&gt;Radio One&lt;/dc:creator&gt;&lt;upnp:albumArtURI&gt;https://cdn.example.com/art/1.jpg&lt;/upnp:albumArtURI&gt;&lt;/item&gt;&lt;/DIDL-Lite&gt;</TrackMetaData><TrackURI>x-rincon-mp3radio://radio.example.com/live</TrackURI><RelTime>0:00:00</RelTime></u:GetPositionInfoResponse></s:Body></s:Envelope>"#;

/// GetPositionInfo response for an empty queue.
pub const POSITION_INFO_EMPTY: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:GetPositionInfoResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"><Track>0</Track><TrackDuration>NOT_IMPLEMENTED</TrackDuration><TrackMetaData></TrackMetaData><TrackURI></TrackURI><RelTime>NOT_IMPLEMENTED</RelTime></u:GetPositionInfoResponse></s:Body></s:Envelope>"#;

/// GetZoneGroupState response with two rooms and a zone bridge.
pub const ZONE_GROUP_STATE: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:GetZoneGroupStateResponse xmlns:u="urn:schemas-upnp-org:service:ZoneGroupTopology:1"><ZoneGroupState>&lt;ZoneGroupState&gt;&lt;ZoneGroups&gt;&lt;ZoneGroup Coordinator=&quot;RINCON_KITCHEN01400&quot; ID=&quot;RINCON_KITCHEN01400:1&quot;&gt;&lt;ZoneGroupMember UUID=&quot;RINCON_KITCHEN01400&quot; Location=&quot;http://192.168.1.10:1400/xml/device_description.xml&quot; ZoneName=&quot;Kitchen&quot;/&gt;&lt;/ZoneGroup&gt;&lt;ZoneGroup Coordinator=&quot;RINCON_OFFICE01400&quot; ID=&quot;RINCON_OFFICE01400:7&quot;&gt;&lt;ZoneGroupMember UUID=&quot;RINCON_OFFICE01400&quot; Location=&quot;http://192.168.1.20:1400/xml/device_description.xml&quot; ZoneName=&quot;Office&quot;/&gt;&lt;ZoneGroupMember UUID=&quot;RINCON_BRIDGE01400&quot; Location=&quot;http://192.168.1.2:1400/xml/device_description.xml&quot; ZoneName=&quot;BRIDGE&quot; IsZoneBridge=&quot;1&quot;/&gt;&lt;/ZoneGroup&gt;&lt;/ZoneGroups&gt;&lt;VanishedDevices/&gt;&lt;/ZoneGroupState&gt;</ZoneGroupState></u:GetZoneGroupStateResponse></s:Body></s:Envelope>"#;

/// Device description document served on `/xml/device_description.xml`.
pub const DEVICE_DESCRIPTION: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:ZonePlayer:1</deviceType>
    <friendlyName>192.168.1.10 - Sonos One - RINCON_KITCHEN01400</friendlyName>
    <manufacturer>Sonos, Inc.</manufacturer>
    <modelNumber>S18</modelNumber>
    <modelName>Sonos One</modelName>
    <roomName>Kitchen</roomName>
    <UDN>uuid:RINCON_KITCHEN01400</UDN>
  </device>
</root>"#;
